use carom::prelude::*;

const EPSILON: f64 = 1E-9;

/// Empty domain large enough for bodies to never reach the walls during a test.
fn open_domain(dims: usize) -> Simulation {
    Simulation::new(&vec![100.0; dims], &vec![4.0; dims], Damping::NONE).unwrap()
}

fn assert_indexed(simulation: &Simulation) {
    let grid = simulation.grid();
    assert_eq!(grid.len(), simulation.len());
    for (id, particle) in simulation.iter().enumerate() {
        assert_eq!(grid.bucket(particle.zone()).iter().filter(|&&i| i == id).count(), 1);
        assert_eq!(particle.zone(), grid.nearest_zone(particle.position()));
    }
}

#[test]
fn equal_masses_exchange_velocities() {
    let mut simulation = open_domain(2);
    let a = simulation
        .spawn_with_radius(Vector::from([10.0, 10.0]), Vector::from([1.0, 0.0]), 1.0, 1.0)
        .unwrap();
    let b = simulation
        .spawn_with_radius(Vector::from([13.0, 10.0]), Vector::from([-1.0, 0.0]), 1.0, 1.0)
        .unwrap();

    let mut resolved = 0;
    while resolved == 0 {
        resolved = simulation.step().unwrap().resolved;
        assert!(simulation.tick() < 10);
    }

    assert_eq!(simulation.particles()[a].velocity(), &Vector::from([-1.0, 0.0]));
    assert_eq!(simulation.particles()[b].velocity(), &Vector::from([1.0, 0.0]));

    // Moving apart from then on.
    for _ in 0..5 {
        assert_eq!(simulation.step().unwrap().resolved, 0);
    }
}

#[test]
fn head_on_from_the_corner() {
    let mut simulation = open_domain(2);
    let a = simulation
        .spawn_with_radius(Vector::from([0.0, 0.0]), Vector::from([1.0, 0.0]), 1.0, 1.0)
        .unwrap();
    let b = simulation
        .spawn_with_radius(Vector::from([3.0, 0.0]), Vector::from([-1.0, 0.0]), 1.0, 1.0)
        .unwrap();
    let x = |s: &Simulation, i: usize| {
        let particle = &s.particles()[i];
        (particle.position().x(), particle.velocity().x())
    };

    // Both bodies start across the y = 0 wall and are clamped to y = 1 as they move, then b
    // catches a and they exchange velocities within the first tick.
    assert_eq!(simulation.step().unwrap().resolved, 1);
    assert_eq!(x(&simulation, a), (0.5, -1.0));
    assert_eq!(x(&simulation, b), (2.5, 1.0));
    for i in [a, b] {
        assert_eq!(simulation.particles()[i].position().y(), 1.0);
        assert_eq!(simulation.particles()[i].velocity().y(), 0.0);
    }
    assert_indexed(&simulation);

    // a was pushed past the x wall: it bounces back, touches b again without any exchange since
    // they now move alike, and both travel on at the same speed.
    assert_eq!(simulation.step().unwrap().resolved, 1);
    assert_eq!(x(&simulation, a), (0.75, 1.0));
    assert_eq!(x(&simulation, b), (3.75, 1.0));

    for _ in 0..10 {
        assert_eq!(simulation.step().unwrap().resolved, 0);
    }
    assert_eq!(simulation.kinetic_energy(), 1.0);
    assert_indexed(&simulation);
}

#[test]
fn wall_reflection() {
    let mut simulation = Simulation::new(&[10.0, 10.0], &[1.0, 1.0], Damping::NONE).unwrap();
    let id = simulation
        .spawn_with_radius(Vector::from([0.5, 5.0]), Vector::from([-1.0, 0.0]), 1.0, 1.0)
        .unwrap();

    simulation.step().unwrap();

    let particle = &simulation.particles()[id];
    assert_eq!(particle.velocity().x(), 1.0);
    assert_eq!(particle.position().x(), 1.0);
    assert_indexed(&simulation);
}

#[test]
fn unequal_masses_in_space() {
    let mut simulation = open_domain(3);
    simulation
        .spawn(Vector::from([40.0, 50.0, 50.0]), Vector::from([1.5, 0.2, 0.0]), 4.0)
        .unwrap();
    simulation
        .spawn(Vector::from([45.0, 50.5, 49.0]), Vector::from([-0.5, 0.0, 0.3]), 2.0)
        .unwrap();

    let momentum = simulation.momentum().unwrap();
    let energy = simulation.kinetic_energy();

    let mut resolved = 0;
    for _ in 0..10 {
        resolved += simulation.step().unwrap().resolved;
    }
    assert_eq!(resolved, 1);

    let after = simulation.momentum().unwrap();
    assert!(momentum.distance(&after).unwrap() < EPSILON);
    assert!((simulation.kinetic_energy() - energy).abs() < EPSILON);
    assert_indexed(&simulation);
}

#[test]
fn elastic_population_keeps_its_energy() {
    let config = SimulationConfig::new(vec![120.0, 120.0], vec![6.0, 6.0])
        .with_population(300)
        .with_mass(6.0)
        .with_max_initial_speed(3.0)
        .with_seed(2024);
    let mut simulation = Simulation::random(&config).unwrap();
    let energy = simulation.kinetic_energy();

    let mut resolved = 0;
    for _ in 0..200 {
        resolved += simulation.step().unwrap().resolved;
        assert_indexed(&simulation);
    }

    assert!(resolved > 0);
    assert!((simulation.kinetic_energy() - energy).abs() / energy < 1E-6);
}

#[test]
fn damping_never_adds_energy() {
    let config = SimulationConfig::new(vec![80.0, 80.0, 80.0], vec![6.0; 3])
        .with_population(200)
        .with_mass(4.0)
        .with_max_initial_speed(3.0)
        .with_wall_damping(0.9)
        .with_collision_damping(0.95)
        .with_seed(8);
    let mut simulation = Simulation::random(&config).unwrap();

    let mut energy = simulation.kinetic_energy();
    for _ in 0..100 {
        simulation.step().unwrap();
        let current = simulation.kinetic_energy();
        assert!(current <= energy * (1.0 + EPSILON));
        energy = current;
    }
    assert_indexed(&simulation);
}

#[test]
fn presets_run() {
    for config in [SimulationConfig::planar(), SimulationConfig::spatial()] {
        let config = config.with_seed(5);
        let mut simulation = Simulation::random(&config).unwrap();
        let mut history = EnergyHistory::new(stats::SPATIAL_HISTORY);

        for _ in 0..5 {
            simulation.step().unwrap();
            history.push(simulation.kinetic_energy());
        }

        assert_eq!(simulation.len(), config.population);
        assert_eq!(history.len(), 5);
        assert_indexed(&simulation);

        let histogram = SpeedHistogram::from_particles(simulation.particles(), 8, 20.0).unwrap();
        assert_eq!(histogram.total(), config.population);
    }
}

#[test]
fn impulses_and_heat() {
    let mut simulation = open_domain(2);
    for x in [20.0, 30.0, 80.0] {
        simulation
            .spawn(Vector::from([x, 50.0]), Vector::from([0.0, 1.0]), 3.0)
            .unwrap();
    }

    let repel = Impulse::Repel {
        center: Vector::from([25.0, 50.0]),
        radius: 10.0,
        strength: 2.0,
    };
    assert_eq!(simulation.apply_impulse(&repel).unwrap(), 2);
    assert_eq!(simulation.particles()[0].velocity(), &Vector::from([-2.0, 1.0]));
    assert_eq!(simulation.particles()[1].velocity(), &Vector::from([2.0, 1.0]));
    assert_eq!(simulation.particles()[2].velocity(), &Vector::from([0.0, 1.0]));

    let energy = simulation.kinetic_energy();
    simulation.heat(1.02);
    assert!((simulation.kinetic_energy() - energy * 1.02 * 1.02).abs() < EPSILON);
}
