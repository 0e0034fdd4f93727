pub fn group_digits<F: std::fmt::Display>(n: F) -> String {
    use numsep::{separate, Locale};
    separate(n, Locale::English)
}


pub mod timing {

    use super::group_digits;
    use log::info;
    use std::time::Instant;

    /// Reports, through the `log` facade, how long successive stages of a
    /// program take.
    pub struct Progress {
        previous: Instant,
        message: String,
    }

    impl Progress {

        #[allow(clippy::new_without_default)]
        pub fn new() -> Self { Self { previous: Instant::now(), message: String::new() } }

        /// Log message, append ellipsis, start timer.
        pub fn start(&mut self, message: &str) {
            info!("{message} ...");
            self.message = message.to_string();
            self.start_timer();
        }

        // Log the message given to the last `start`, with the time elapsed since
        // then
        pub fn done(&mut self) {
            info!("{} done: {} ms", self.message, group_digits(self.elapsed_ms()));
            self.start_timer();
        }

        // Log message followed by time elapsed since last start or done
        pub fn done_with_message(&mut self, message: &str) {
            info!("{message}: {} ms", group_digits(self.elapsed_ms()));
            self.start_timer();
        }

        fn elapsed_ms(&self) -> u128 { self.previous.elapsed().as_millis() }

        fn start_timer(&mut self) { self.previous = Instant::now() }
    }
}
