use std::net::SocketAddr;
use std::sync::Arc;

use call_log_sink::init::init_tracing;
use call_log_sink::{Interceptor, JsonLinesSink, RequestContext, TracingSink};

struct DemoController;

impl DemoController {
    fn say_hello(&self) -> String {
        "Hello, World!".to_string()
    }

    fn add(&self, a: i64, b: i64) -> i64 {
        a + b
    }
}

fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("tracing init failed: {}", e);
    }

    // Records go through `tracing` as `Log Entry: {...}` lines.
    let interceptor = Interceptor::new(Arc::new(TracingSink));
    let controller = interceptor.mark(DemoController);

    let anonymous = RequestContext::anonymous();
    let greeting = controller.invoke(&anonymous, "sayHello", (), |c, ()| c.say_hello());
    println!("{}", greeting);

    let peer: SocketAddr = ([192, 168, 1, 20], 51000).into();
    let alice = RequestContext::anonymous().with_principal("alice").with_peer(peer);
    let sum = controller.invoke(&alice, "add", (2i64, 3i64), |c, (a, b)| c.add(a, b));
    println!("2 + 3 = {}", sum);

    // Same calls, but written as raw JSON lines on stdout.
    let stdout = Interceptor::new(Arc::new(JsonLinesSink::stdout()));
    let hello = stdout.wrap("sayHello", |()| DemoController.say_hello());
    hello.call(&anonymous, ());
}
