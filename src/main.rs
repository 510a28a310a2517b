use anyhow::Context;
use slidesbot::{
    cli::{is_exit_command, output::Output, Cli, Commands},
    utils::toml_config::DEFAULT_CONFIG_FILE,
    AgentRegistry, BotConfig, CompletionService, Coordinator, DirectoryLoader, FinishReason,
    JsonFileStore, LlmCredentialsFile, OpenAICompatibleClient, SummaryEngine, TitleIndex,
};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = Arc::new(if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    });

    // An explicit -c must exist; the default file is optional
    let config = if cli.config == Path::new(DEFAULT_CONFIG_FILE) {
        BotConfig::load_or_default(&cli.config)?
    } else {
        BotConfig::load(&cli.config)?
    };

    init_tracing(&config.logging.level, cli.verbose);

    let credentials = cli
        .config_llm
        .as_deref()
        .map(LlmCredentialsFile::load)
        .transpose()
        .context("Failed to load --config-llm file")?;
    let settings = config.client_settings(credentials.as_ref()).context(
        "No API key available. Set the configured environment variable or pass --config-llm",
    )?;
    let llm: Arc<dyn CompletionService> = Arc::new(OpenAICompatibleClient::new(settings)?);

    let titles = TitleIndex::load(&config.course.index_path())?;
    let count = u32::try_from(titles.len()).context("Too many lectures in the title index")?;
    let layout = config.course.layout(count);
    let loader = Arc::new(DirectoryLoader::new(&config.course.root, layout.clone()));
    let store = Arc::new(JsonFileStore::new(config.course.catalog_path()));

    output.banner();
    output.info(&format!(
        "{} lectures ({}), catalog at {}",
        count,
        layout.describe_range(),
        config.course.catalog_path().display()
    ));

    let catalog = SummaryEngine::new(
        llm.clone(),
        loader.clone(),
        store,
        titles,
        config.summary_config(),
    )
    .with_observer(output.clone())
    .run()
    .await?;

    if let Some(Commands::Summarize) = cli.command {
        output.success(&format!("All {} lectures are summarized", count));
        return Ok(());
    }

    let summaries = catalog.complete_records(layout.ids())?;
    let registry = Arc::new(AgentRegistry::new(
        llm.clone(),
        loader,
        layout,
        summaries,
        config.specialist_config(),
    ));
    let mut coordinator_config = config.coordinator_config();
    if let Some(max_iterations) = cli.max_iterations {
        coordinator_config.max_iterations = max_iterations;
    }
    let coordinator =
        Coordinator::new(llm, registry, coordinator_config).with_observer(output.clone());

    if let Some(question) = cli.question {
        let result = coordinator.ask(&question).await?;
        report(&output, result.finish_reason, &result.answer);
        return Ok(());
    }

    output.info("Entering interactive mode. Type 'exit' to quit.");
    while let Some(line) = output.prompt()? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_command(question) {
            break;
        }

        match coordinator.ask(question).await {
            Ok(result) => report(&output, result.finish_reason, &result.answer),
            Err(e) => output.error(&e.to_string()),
        }
    }

    Ok(())
}

fn report(output: &Output, finish_reason: FinishReason, answer: &str) {
    match finish_reason {
        FinishReason::Answered => {}
        FinishReason::Forced => output.warning("Iteration budget spent; the answer was forced"),
        FinishReason::Failed => {
            output.error(answer);
            return;
        }
    }
    output.final_answer(answer);
}

fn init_tracing(level: &str, verbose: bool) {
    let default_filter = if verbose { "debug" } else { level };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
