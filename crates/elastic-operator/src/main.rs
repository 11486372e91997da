//! Elastic operator - per-replica pod rendering for elastic training jobs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::CustomResourceExt;
use tracing::info;

use elastic_common::crd::{ElasticJob, REPLICA_TYPE_WORKER};
use elastic_common::telemetry::{init_tracing, LogFormat, TelemetryConfig};
use elastic_job::{
    ElasticConfig, JobError, PodTemplateConfigurer, ReplicaOracle, WorkerReplicasOracle,
};

/// Elastic - rendezvous-aware pod rendering for ElasticJob
#[derive(Parser, Debug)]
#[command(name = "elastic", version, about, long_about = None)]
struct Cli {
    /// Operator config file (YAML); defaults apply when omitted
    #[arg(long, global = true, env = "ELASTIC_CONFIG")]
    config: Option<PathBuf>,

    /// Log format: json (default) or text
    #[arg(long, global = true, env = "ELASTIC_LOG_FORMAT", default_value = "json")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the ElasticJob CRD manifest
    Crd,

    /// Render the Worker pod template of one replica
    ///
    /// Reads an ElasticJob manifest and prints the template with rendezvous
    /// arguments injected and claims bound to the replica index. No cluster
    /// access is needed.
    Render {
        /// Path to the ElasticJob manifest
        #[arg(long)]
        job: PathBuf,

        /// Replica index to render
        #[arg(long)]
        index: u32,

        /// Desired replica count; defaults to the Worker replica count
        #[arg(long)]
        desired: Option<i32>,
    },
}

/// Oracle answering with a count given on the command line
struct FixedReplicas(i32);

impl ReplicaOracle for FixedReplicas {
    fn desired_replicas(&self, _job: &ElasticJob) -> Result<i32, JobError> {
        Ok(self.0)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TelemetryConfig {
        service_name: "elastic".to_string(),
        format: cli.log_format,
    })?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Crd => {
            let crd = serde_yaml::to_string(&ElasticJob::crd())
                .map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
            println!("{crd}");
        }
        Commands::Render {
            job,
            index,
            desired,
        } => {
            let template = render(&config, &job, index, desired)?;
            print!("{}", serde_yaml::to_string(&template)?);
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ElasticConfig> {
    let Some(path) = path else {
        return Ok(ElasticConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = ElasticConfig::from_yaml(&raw)?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

fn render(
    config: &ElasticConfig,
    job_path: &Path,
    index: u32,
    desired: Option<i32>,
) -> anyhow::Result<PodTemplateSpec> {
    let raw = std::fs::read_to_string(job_path)
        .with_context(|| format!("failed to read job manifest {}", job_path.display()))?;
    let job: ElasticJob = serde_yaml::from_str(&raw)
        .with_context(|| format!("{} is not an ElasticJob manifest", job_path.display()))?;

    let template = job
        .spec
        .worker()
        .map(|w| w.template.clone())
        .with_context(|| format!("job has no {REPLICA_TYPE_WORKER} replica spec"))?;

    let oracle: Arc<dyn ReplicaOracle> = match desired {
        Some(n) => Arc::new(FixedReplicas(n)),
        None => Arc::new(WorkerReplicasOracle),
    };
    let configurer = PodTemplateConfigurer::new(config.clone(), oracle);
    let configured = configurer.configure(&job, &template, &index.to_string())?;

    info!(
        job = %job.metadata.name.as_deref().unwrap_or_default(),
        index,
        "rendered replica template"
    );
    Ok(configured)
}
