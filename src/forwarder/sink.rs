/// Receiver for the payload of a successfully reassembled message destined
/// for this router. Kept as a trait so integration tests can capture
/// deliveries instead of scraping stdout.
pub trait DeliverySink {
    fn deliver(&mut self, payload: &[u8]);
}

/// Prints the delivered payload, and nothing else, to standard output —
/// the "payload only" contract of the logging surface (see SPEC_FULL §6.3).
pub struct StdoutSink;

impl DeliverySink for StdoutSink {
    fn deliver(&mut self, payload: &[u8]) {
        println!("{}", String::from_utf8_lossy(payload));
    }
}
