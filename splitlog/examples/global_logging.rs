use std::collections::HashMap;

fn main() {
    // console sink behind the `log` macros, Info and above
    let config: HashMap<String, String> = [("log_level".to_string(), "Info".to_string())].into();
    let guard = splitlog::init_global("console", &config).expect("Unable to init logger");

    log::debug!("not shown");
    log::info!("Hello, world!");

    let handles: Vec<_> = (0..5)
        .map(|i| std::thread::spawn(move || log::warn!("Hello, world from thread {i}!")))
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    guard.logger().set_level(splitlog::Level::Error);
    log::warn!("not shown either");
    log::error!("bye");
}
