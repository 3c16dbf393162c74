use weather_core::{Event, Observer};

/// Prints service events: failures to stderr, everything else to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl Observer for ConsoleObserver {
    fn notify(&self, event: &Event) {
        let lines = event.lines();
        if event.is_error() {
            for line in lines {
                eprintln!("{line}");
            }
        } else {
            for line in lines {
                println!("{line}");
            }
        }
    }
}
