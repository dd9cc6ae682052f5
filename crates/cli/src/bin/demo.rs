//! A small reflection binary over a demo application.
//!
//! `APPREFLECT_DEMO_FAIL` injects a failure at one point of startup or typegen:
//! `import`, `start`, `panic`, `load`, `write` or `hang`.
//! `APPREFLECT_DEMO_LINGER_SECS` keeps the process alive after it has reported,
//! like an application that leaves listeners running.

use anyhow::bail;
use appreflect_core::{
    AppRunner, AppState, ArtifactRequest, ArtifactWriter, FsArtifactWriter, Layout,
    PluginDescriptor, PluginLoader, ReflectionHost, ResolvedSchema, RunnerOptions, RuntimePlugin,
    SchemaSettings, run_child,
};
use std::thread;
use std::time::Duration;
use tracing::debug;

const FAIL_ENV: &str = "APPREFLECT_DEMO_FAIL";
const LINGER_ENV: &str = "APPREFLECT_DEMO_LINGER_SECS";

const SCHEMA_SDL: &str = "\
type Query {
  products: [Product!]!
}

type Product {
  id: ID!
  name: String!
  attributes: JSON
}
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailurePoint {
    Import,
    Start,
    Panic,
    Load,
    Write,
    Hang,
}

impl FailurePoint {
    fn from_env() -> Option<Self> {
        match std::env::var(FAIL_ENV).ok()?.as_str() {
            "import" => Some(Self::Import),
            "start" => Some(Self::Start),
            "panic" => Some(Self::Panic),
            "load" => Some(Self::Load),
            "write" => Some(Self::Write),
            "hang" => Some(Self::Hang),
            _ => None,
        }
    }
}

struct DemoHost {
    fail: Option<FailurePoint>,
    writer: FsArtifactWriter,
}

struct DemoApp {
    plugins: Vec<PluginDescriptor>,
}

struct DemoRunner {
    app: DemoApp,
    fail: Option<FailurePoint>,
    state: AppState,
}

impl DemoHost {
    fn fails_at(&self, point: FailurePoint) -> bool {
        self.fail == Some(point)
    }
}

impl ReflectionHost for DemoHost {
    type App = DemoApp;

    fn import_app(&self, layout: &Layout) -> anyhow::Result<DemoApp> {
        if self.fails_at(FailurePoint::Import) {
            bail!(
                "no application exported from {}",
                layout.source_root.display()
            );
        }
        Ok(DemoApp {
            plugins: vec![
                PluginDescriptor::new("json-scalars", "appreflect-json-scalars")
                    .with_version("0.3.1"),
                PluginDescriptor::new("relay", "appreflect-relay")
                    .with_version("1.0.0")
                    .with_settings(serde_json::json!({ "max_page_size": 100 })),
            ],
        })
    }

    fn create_runner(
        &self,
        _layout: &Layout,
        app: DemoApp,
        options: RunnerOptions,
    ) -> anyhow::Result<Box<dyn AppRunner>> {
        debug!(
            "Creating runner (catch_unhandled_errors={})",
            options.catch_unhandled_errors
        );
        Ok(Box::new(DemoRunner {
            app,
            fail: self.fail,
            state: AppState::default(),
        }))
    }

    fn plugin_loader(&self) -> &dyn PluginLoader {
        self
    }

    fn artifact_writer(&self) -> &dyn ArtifactWriter {
        self
    }
}

impl AppRunner for DemoRunner {
    fn start(&mut self) -> anyhow::Result<()> {
        match self.fail {
            Some(FailurePoint::Start) => bail!("address 127.0.0.1:4000 already in use"),
            Some(FailurePoint::Panic) => panic!("schema builder panicked"),
            Some(FailurePoint::Hang) => loop {
                thread::sleep(Duration::from_secs(60));
            },
            _ => {}
        }

        self.state = AppState {
            plugins: self.app.plugins.clone(),
            schema: Some(
                ResolvedSchema::new(SCHEMA_SDL)
                    .with_type("Query")
                    .with_type("Product"),
            ),
            schema_settings: SchemaSettings::default(),
        };
        Ok(())
    }

    fn state(&self) -> &AppState {
        &self.state
    }
}

impl PluginLoader for DemoHost {
    fn import_and_load_runtime_plugins(
        &self,
        plugins: &[PluginDescriptor],
    ) -> anyhow::Result<Vec<RuntimePlugin>> {
        if self.fails_at(FailurePoint::Load) {
            bail!("plugin 'relay' failed to load its runtime");
        }
        Ok(plugins
            .iter()
            .map(|plugin| {
                let module = plugin.package_name.replace('-', "_");
                RuntimePlugin::new(plugin.clone()).with_typegen_import(format!("{module}::typegen"))
            })
            .collect())
    }
}

impl ArtifactWriter for DemoHost {
    fn write_artifacts(&self, request: ArtifactRequest<'_>) -> anyhow::Result<()> {
        if self.fails_at(FailurePoint::Write) {
            bail!(
                "refusing to write into {}",
                request.layout.artifacts_path().display()
            );
        }
        self.writer.write_artifacts(request)
    }
}

fn main() -> Result<(), appreflect_core::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let host = DemoHost {
        fail: FailurePoint::from_env(),
        writer: FsArtifactWriter,
    };
    let result = run_child(&host);

    if let Some(secs) = std::env::var(LINGER_ENV)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
    {
        debug!("Lingering for {}s", secs);
        thread::sleep(Duration::from_secs(secs));
    }
    result
}
