use std::sync::Arc;
use std::time::Instant;

use call_log_sink::{Interceptor, Invocation, NoopSink, RequestContext};

fn main() {
    let interceptor = Interceptor::new(Arc::new(NoopSink));
    let ctx = RequestContext::anonymous().with_principal("load");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        interceptor.call(&ctx, Invocation::with_args("square", &(i,)), || i.wrapping_mul(i));
    }

    let elapsed = start.elapsed();
    println!(
        "noop sink: intercepted {} calls in {:?} (~{:.0} calls/s)",
        interceptor.stats().emitted(),
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
