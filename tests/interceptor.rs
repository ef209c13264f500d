use call_log_sink::{
    FailurePolicy, Interceptor, InterceptorConfig, Invocation, JsonLinesSink, LogSink, MemorySink,
    RequestContext,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

fn setup() -> (Interceptor, MemorySink) {
    let sink = MemorySink::new();
    let interceptor = Interceptor::new(Arc::new(sink.clone()));
    (interceptor, sink)
}

fn say_hello() -> String {
    "Hello, World!".to_string()
}

fn add(a: i64, b: i64) -> i64 {
    a + b
}

#[derive(Debug, PartialEq)]
struct Overdrawn {
    balance: i64,
}

impl std::fmt::Display for Overdrawn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "balance would drop to {}", self.balance)
    }
}

fn withdraw(balance: i64, amount: i64) -> Result<i64, Overdrawn> {
    if amount > balance {
        Err(Overdrawn {
            balance: balance - amount,
        })
    } else {
        Ok(balance - amount)
    }
}

#[test]
fn anonymous_hello_is_logged() {
    let (interceptor, sink) = setup();
    let hello = interceptor.wrap("sayHello", |()| say_hello());

    let out = hello.call(&RequestContext::anonymous(), ());
    assert_eq!(out, "Hello, World!");

    let records = sink.records();
    assert_eq!(records.len(), 1);

    let value = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(value["methodName"], "sayHello");
    assert_eq!(value["arguments"], json!([]));
    assert_eq!(value["result"], "Hello, World!");
    assert_eq!(value["username"], "Anonymous");
    assert_eq!(value["ipAddress"], "127.0.0.1");
    assert!(value["executionTime"].as_u64().is_some());
}

#[test]
fn authenticated_add_records_arguments_and_result() {
    let (interceptor, sink) = setup();
    let ctx = RequestContext::anonymous()
        .with_principal("alice")
        .with_source_address("203.0.113.9");

    let sum = interceptor.call(&ctx, Invocation::with_args("add", &(2, 3)), || add(2, 3));
    assert_eq!(sum, add(2, 3));

    let record = &sink.records()[0];
    assert_eq!(record.method_name(), "add");
    assert_eq!(record.arguments(), &[json!(2), json!(3)]);
    assert_eq!(record.result(), Some(&json!(5)));
    assert_eq!(record.username(), "alice");
    assert_eq!(record.ip_address(), "203.0.113.9");
}

#[test]
fn failed_call_propagates_without_record() {
    let (interceptor, sink) = setup();
    let guarded = interceptor.wrap("withdraw", |(balance, amount): (i64, i64)| {
        withdraw(balance, amount)
    });

    let out = guarded.try_call(&(), (10, 25));

    assert_eq!(out, Err(Overdrawn { balance: -15 }));
    assert!(sink.is_empty());
    assert_eq!(interceptor.stats().skipped(), 1);
    assert_eq!(interceptor.stats().emitted(), 0);

    assert_eq!(guarded.try_call(&(), (10, 4)), Ok(6));
    assert_eq!(sink.len(), 1);
}

#[test]
fn failed_call_is_recorded_when_enabled() {
    let sink = MemorySink::new();
    let config = InterceptorConfig {
        failure_policy: FailurePolicy::Record,
        ..InterceptorConfig::default()
    };
    let interceptor = Interceptor::with_config(Arc::new(sink.clone()), config);

    let out = interceptor.intercept(&(), Invocation::with_args("withdraw", &(1, 2)), || {
        withdraw(1, 2)
    });
    assert_eq!(out, Err(Overdrawn { balance: -1 }));

    let value = serde_json::to_value(&sink.records()[0]).unwrap();
    assert_eq!(value["error"], "balance would drop to -1");
    assert!(value.get("result").is_none());
}

#[test]
fn argument_order_survives_serialization() {
    let (interceptor, sink) = setup();
    interceptor.call(&(), Invocation::with_args("triple", &("a", "b", "c")), || 0);

    let line = sink.records()[0].to_json().unwrap();
    let value: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["arguments"], json!(["a", "b", "c"]));
}

#[test]
fn no_null_values_in_output() {
    let sink = JsonLinesSink::new(Vec::new());
    let shared: Arc<JsonLinesSink<Vec<u8>>> = Arc::new(sink);
    let interceptor = Interceptor::new(shared.clone());

    interceptor.call(&(), Invocation::new("reset"), || ());
    interceptor.call(&(), Invocation::new("maybe"), || Option::<u8>::None);
    interceptor.call(&(), Invocation::new("some"), || Some(1u8));
    shared.flush().unwrap();

    drop(interceptor);
    let sink = Arc::try_unwrap(shared).ok().unwrap();
    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();

    let lines: Vec<Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    for line in &lines {
        assert!(line.as_object().unwrap().values().all(|v| !v.is_null()));
    }
    assert!(lines[0].get("result").is_none());
    assert!(lines[1].get("result").is_none());
    assert_eq!(lines[2]["result"], 1);
}

#[tokio::test]
async fn async_calls_are_logged_before_they_resolve() {
    let (interceptor, sink) = setup();
    let ctx = RequestContext::anonymous().with_principal("carol");

    let out = interceptor
        .call_async(&ctx, Invocation::with_args("fetch", &("item-7",)), async {
            sleep(Duration::from_millis(15)).await;
            "payload"
        })
        .await;

    assert_eq!(out, "payload");
    let record = &sink.records()[0];
    assert_eq!(record.username(), "carol");
    assert!(record.execution_time_millis() >= 15);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_calls_do_not_mix_records() {
    let (interceptor, sink) = setup();

    let slow = {
        let interceptor = interceptor.clone();
        tokio::spawn(async move {
            let ctx = RequestContext::anonymous().with_principal("slow");
            interceptor
                .call_async(&ctx, Invocation::with_args("add", &(1, 2)), async {
                    sleep(Duration::from_millis(60)).await;
                    add(1, 2)
                })
                .await
        })
    };
    let fast = {
        let interceptor = interceptor.clone();
        tokio::spawn(async move {
            let ctx = RequestContext::anonymous().with_principal("fast");
            interceptor
                .call_async(&ctx, Invocation::with_args("add", &(10, 20)), async {
                    add(10, 20)
                })
                .await
        })
    };

    assert_eq!(slow.await.unwrap(), 3);
    assert_eq!(fast.await.unwrap(), 30);

    let records = sink.records();
    assert_eq!(records.len(), 2);

    let slow = records.iter().find(|r| r.username() == "slow").unwrap();
    let fast = records.iter().find(|r| r.username() == "fast").unwrap();
    assert_eq!(slow.arguments(), &[json!(1), json!(2)]);
    assert_eq!(slow.result(), Some(&json!(3)));
    assert!(slow.execution_time_millis() >= 60);
    assert_eq!(fast.arguments(), &[json!(10), json!(20)]);
    assert_eq!(fast.result(), Some(&json!(30)));
    assert!(fast.execution_time_millis() < slow.execution_time_millis());
}

#[test]
fn threads_share_one_sink() {
    let (interceptor, sink) = setup();

    std::thread::scope(|scope| {
        for i in 0..8i64 {
            let interceptor = &interceptor;
            scope.spawn(move || {
                let ctx = RequestContext::anonymous().with_principal(format!("user-{i}"));
                interceptor.call(&ctx, Invocation::with_args("add", &(i, i)), || add(i, i))
            });
        }
    });

    let records = sink.records();
    assert_eq!(records.len(), 8);
    for record in &records {
        let i: i64 = record.username()["user-".len()..].parse().unwrap();
        assert_eq!(record.arguments(), &[json!(i), json!(i)]);
        assert_eq!(record.result(), Some(&json!(i + i)));
    }
    assert_eq!(interceptor.stats().emitted(), 8);
}

#[tokio::test]
async fn async_failure_is_returned_without_record() {
    let (interceptor, sink) = setup();

    let out = interceptor
        .intercept_async(&(), Invocation::with_args("withdraw", &(5, 9)), async {
            sleep(Duration::from_millis(5)).await;
            withdraw(5, 9)
        })
        .await;

    assert_eq!(out, Err(Overdrawn { balance: -4 }));
    assert!(sink.is_empty());
    assert_eq!(interceptor.stats().skipped(), 1);
    assert_eq!(interceptor.stats().emitted(), 0);
}

#[tokio::test]
async fn dropped_call_emits_nothing() {
    let (interceptor, sink) = setup();

    let pending = interceptor.call_async(&(), Invocation::new("hang"), async {
        sleep(Duration::from_secs(60)).await;
        "never"
    });
    let timed_out = timeout(Duration::from_millis(20), pending).await;

    assert!(timed_out.is_err());
    assert!(sink.is_empty());
    assert_eq!(interceptor.stats().intercepted(), 0);
}
