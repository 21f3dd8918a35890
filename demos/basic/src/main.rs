use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;
use tracing_subscriber::EnvFilter;
use wirebox::{typed, Container, Context};

#[derive(Debug)]
struct Config {
    greeting: String,
}

#[derive(Debug)]
struct Counter(AtomicU64);

#[derive(Clone, Debug)]
struct RequestId(u64);

#[derive(Debug)]
struct Greeter {
    config: Arc<Config>,
    request: Option<RequestId>,
}

impl Greeter {
    fn greet(&self, who: &str) -> String {
        match &self.request {
            Some(RequestId(id)) => format!("[{}] {}, {}!", id, self.config.greeting, who),
            None => format!("{}, {}!", self.config.greeting, who),
        }
    }
}

fn build() -> Container {
    let container = Container::new();

    container
        .add_service(|| Arc::new(Config { greeting: "Hello".into() }))
        .as_singleton();

    container
        .add_service(|| Arc::new(Counter(AtomicU64::new(0))))
        .as_singleton()
        .set_typed_dispose::<Arc<Counter>, _>(|_, counter| {
            info!(requests = counter.0.load(Ordering::SeqCst), "counter disposed");
        });

    container
        .add_service(|config: Arc<Config>, ctx: Context, counter: Arc<Counter>| {
            counter.0.fetch_add(1, Ordering::SeqCst);
            Arc::new(Greeter {
                config,
                request: ctx.value::<RequestId>().cloned(),
            })
        })
        .set_name("greeter")
        .as_scoped();

    container
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let container = build();
    println!("Container: {:?}", container);

    for id in 1..=3 {
        let scope = container
            .create_scope_with_context(Context::background().with_value(RequestId(id)));

        let greeter: Arc<Greeter> = typed::get_by_name(&scope, "greeter");
        let again: Arc<Greeter> = typed::get_by_name(&scope, "greeter");

        println!("{}", greeter.greet("world"));
        println!("same greeter within request: {}", Arc::ptr_eq(&greeter, &again));
    }

    container.clean(&Context::background());
}
