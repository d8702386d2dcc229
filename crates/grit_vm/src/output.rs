/// Destination for values emitted by `OUTPUT`.
pub trait OutputSink {
    fn emit(&mut self, value: i64);
}

/// Prints one value per line to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, value: i64) {
        println!("{value}");
    }
}

/// Collects emitted values in order.
impl OutputSink for Vec<i64> {
    fn emit(&mut self, value: i64) {
        self.push(value);
    }
}

impl<T: OutputSink + ?Sized> OutputSink for &mut T {
    fn emit(&mut self, value: i64) {
        (**self).emit(value);
    }
}
