use fibre_logcore::writer::console::{ConsoleStream, ConsoleWriterFactory};
use fibre_logcore::writer::ColorMode;
use fibre_logcore::{record, record_general, register_handler, Dispatcher, Severity};
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct AccessLine {
  from: &'static str,
  to: &'static str,
  outbound: &'static str,
}

impl fmt::Display for AccessLine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[Info] {} accepted tcp:{} [{}]", self.from, self.to, self.outbound)
  }
}

fn main() {
  let factory = ConsoleWriterFactory::new(ConsoleStream::Stdout).color(ColorMode::Always);
  let dispatcher = Arc::new(
    Dispatcher::builder(factory)
      .idle_timeout(Duration::from_millis(200))
      .build(),
  );
  register_handler(dispatcher.clone());

  record_general(Severity::Info, "listening on 127.0.0.1:1080");
  record_general(Severity::Warning, "dns cache is cold");
  record(AccessLine {
    from: "127.0.0.1:53122",
    to: "example.com:443",
    outbound: "proxy",
  });
  record_general(Severity::Error, "failed to dial upstream: connection refused");
  record_general(Severity::Debug, "closing idle connections");

  // Give the drain thread time to write, then let it go idle.
  thread::sleep(Duration::from_millis(500));
  println!("dispatcher state: {:?}", dispatcher.state());

  let _ = dispatcher.close();
}
