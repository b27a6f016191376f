use simulator::Scheduler;

fn main() {
    let print_time: f64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(1.5);

    let scheduler = Scheduler::new();
    let clock = scheduler.clone();
    scheduler
        .schedule(print_time, move || {
            println!("Hello simulated world! The virtual clock reads {}.", clock.now());
        })
        .unwrap();

    println!("Starting the simulation.");
    scheduler.run().unwrap();
    println!("Simulation ended at t={}.", scheduler.now());
    scheduler.destroy();
}
