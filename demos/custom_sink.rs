use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use call_log_sink::{
    FailurePolicy, Interceptor, InterceptorConfig, Invocation, LogRecord, LogSink, RequestContext,
    SinkError,
};

/// Example of integrating a completely custom destination by implementing
/// the `LogSink` trait directly. This one only prints slow calls and
/// counts the rest.
struct SlowCallSink {
    threshold_ms: u64,
    fast: AtomicU64,
}

impl LogSink for SlowCallSink {
    fn send(&self, record: &LogRecord) -> Result<(), SinkError> {
        if record.execution_time_millis() >= self.threshold_ms || record.error().is_some() {
            println!("[slow-calls] {}", record.to_json()?);
        } else {
            self.fast.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

fn lookup(id: u32) -> Result<String, String> {
    std::thread::sleep(std::time::Duration::from_millis(u64::from(id) * 10));
    if id == 0 {
        Err("id 0 is reserved".to_string())
    } else {
        Ok(format!("item-{}", id))
    }
}

fn main() {
    let sink = Arc::new(SlowCallSink {
        threshold_ms: 30,
        fast: AtomicU64::new(0),
    });
    let config = InterceptorConfig {
        service_name: Some("catalog".to_string()),
        failure_policy: FailurePolicy::Record,
        ..InterceptorConfig::default()
    };
    let interceptor = Interceptor::with_config(sink.clone(), config);
    let ctx = RequestContext::anonymous().with_principal("ops");

    for id in 0..5u32 {
        let found = interceptor.intercept(&ctx, Invocation::with_args("lookup", &(id,)), || {
            lookup(id)
        });
        println!("lookup({}) -> {:?}", id, found);
    }

    println!("fast calls: {}", sink.fast.load(Ordering::Relaxed));
}
