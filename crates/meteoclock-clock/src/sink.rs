/// Output slots the clock writes into.
///
/// The clock only writes; presentation belongs to the implementor.
pub trait DisplaySink: Send + 'static {
    /// Receives `HH:MM:SS`
    fn show_time(&mut self, time: &str);

    /// Receives the capitalized long-form date
    fn show_date(&mut self, date: &str);
}
