use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use artwork_core::{
    build_search_url, update, Config, ConfigStore, ControllerState, Msg, SelectionRequest,
    SessionState, Theme, ALL_SOURCES,
};
use artwork_engine::{
    decode_page, extract_album_info, write_atomic, AgentSettings, EngineHandle, FetchSettings,
    FormControl, FormDocument, InjectSettings,
};
use artwork_logging::{artwork_info, LogDestination};
use log::LevelFilter;
use url::Url;
use uuid::Uuid;

use super::effects::EffectRunner;
use super::persistence::{load_or_default, RonConfigStore};
use super::picker::SnapshotPicker;
use crate::{AlbumArgs, Cli, Commands, ConfigArgs, LogTarget, RunArgs};

pub(crate) fn run(cli: Cli) -> anyhow::Result<()> {
    let store = RonConfigStore::new(&cli.config_dir);
    let config = load_or_default(&store, &cli.config_dir);

    let destination = match cli.log {
        LogTarget::Terminal => LogDestination::Terminal,
        LogTarget::File => LogDestination::File,
        LogTarget::Both => LogDestination::Both,
    };
    let level = if cli.verbose || config.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    artwork_logging::initialize(destination, level);
    artwork_logging::set_diagnostics(config.debug);

    match cli.command {
        Commands::Run(args) => {
            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            runtime.block_on(run_session(config, args))
        }
        Commands::SearchUrl(args) => {
            let (artist, album) = album_from_args(&args)
                .ok_or_else(|| anyhow!("--artist and --album are required"))?;
            let request = SelectionRequest::new(artist, album, &config);
            let url = build_search_url(&config.search_origin, &config.remote_agent, &request, None)
                .context("building search url")?;
            println!("{url}");
            Ok(())
        }
        Commands::Config(args) => configure(&store, config, args),
    }
}

async fn run_session(config: Config, args: RunArgs) -> anyhow::Result<()> {
    let picker_html = read_page(&args.picker)?;
    let form_html = read_page(&args.form)?;
    let (artist, album) = resolve_album(&args, &form_html)?;
    println!("Album: {artist} - {album}");

    let form = Arc::new(FormDocument::parse(&form_html));
    let engine = EngineHandle::with_reqwest(
        FetchSettings::default(),
        form.clone(),
        InjectSettings {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_millis(config.input_wait_timeout_ms),
        },
    );
    let picker = SnapshotPicker::new(
        picker_html,
        args.click.clone(),
        AgentSettings {
            image_wait_timeout: Duration::from_millis(config.image_wait_timeout_ms),
            ..AgentSettings::default()
        },
    );
    let mut runner = EffectRunner::new(engine, picker, config.clone());

    let request = SelectionRequest::new(artist, album, &config);
    let mut state = ControllerState::new(config);
    let mut inbox = VecDeque::from([Msg::OpenPicker {
        request,
        session_token: Uuid::new_v4().to_string(),
    }]);

    while let Some(msg) = inbox.pop_front() {
        let (next, effects) = update(state, msg);
        state = next;
        if state.consume_dirty() {
            println!("{}", state.view().status);
        }
        inbox.extend(runner.run(effects).await?);
    }

    if state.session().is_working() {
        let (next, effects) = update(state, Msg::HostClosing);
        state = next;
        runner.run(effects).await?;
    }

    report(&state, &form, &runner, args.save_to.as_deref())
}

fn report(
    state: &ControllerState,
    form: &FormDocument,
    runner: &EffectRunner,
    save_to: Option<&Path>,
) -> anyhow::Result<()> {
    let view = state.view();
    match state.session() {
        SessionState::Complete => {
            if let Some(file) = form.file() {
                println!("File:        {} ({} bytes)", file.file_name, file.byte_len());
            }
            for (label, control) in [
                ("Title", FormControl::Title),
                ("Description", FormControl::Description),
            ] {
                if let Some(value) = form.value(control) {
                    println!("{:<12} {value}", format!("{label}:"));
                }
            }
            if let (Some(dir), Some(artifact)) = (save_to, runner.engine().artifact()) {
                let path = write_atomic(dir, &artifact.file_name, &artifact.bytes)
                    .with_context(|| format!("saving artwork into {}", dir.display()))?;
                println!("Saved:       {}", path.display());
            }
            Ok(())
        }
        SessionState::Failed(reason) => {
            if let Some(url) = runner.fallback_url() {
                println!("Open {url} to download the artwork and upload it by hand.");
            }
            bail!("session failed: {reason}")
        }
        other => {
            artwork_info!("Session ended in {:?}", other);
            println!("{}", view.status);
            Ok(())
        }
    }
}

fn read_page(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let page = decode_page(&bytes).with_context(|| format!("decoding {}", path.display()))?;
    artwork_info!("Loaded {} as {}", path.display(), page.encoding_label);
    Ok(page.html)
}

fn album_from_args(args: &AlbumArgs) -> Option<(String, String)> {
    let artist = args.artist.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let album = args.album.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    Some((artist.to_string(), album.to_string()))
}

/// Explicit arguments win; otherwise the host page's metadata or URL path decides.
fn resolve_album(args: &RunArgs, form_html: &str) -> anyhow::Result<(String, String)> {
    if let Some(pair) = album_from_args(&args.album) {
        return Ok(pair);
    }
    let raw = args
        .host_url
        .as_deref()
        .ok_or_else(|| anyhow!("pass --artist and --album, or --host-url of the upload page"))?;
    let host_url = Url::parse(raw).with_context(|| format!("invalid host url {raw}"))?;
    let info = extract_album_info(form_html, &host_url)
        .ok_or_else(|| anyhow!("could not work out artist and album from {raw}"))?;
    Ok((info.artist, info.album))
}

fn configure(store: &dyn ConfigStore, config: Config, args: ConfigArgs) -> anyhow::Result<()> {
    let config = apply_changes(config, &args)?;
    let changed = args.reset
        || args.theme.is_some()
        || args.resolution.is_some()
        || args.sources.is_some()
        || args.country.is_some()
        || args.debug.is_some();
    if changed {
        store.save(&config).context("saving settings")?;
    }
    let pretty = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new())
        .context("formatting settings")?;
    println!("{pretty}");
    Ok(())
}

fn apply_changes(config: Config, args: &ConfigArgs) -> anyhow::Result<Config> {
    let mut config = if args.reset { Config::default() } else { config };
    if let Some(theme) = args.theme.as_deref() {
        config.theme = match theme {
            "light" => Theme::Light,
            _ => Theme::Dark,
        };
    }
    if let Some(resolution) = args.resolution {
        config.resolution = resolution;
    }
    if let Some(sources) = &args.sources {
        config.sources = canonical_sources(sources)?;
    }
    if let Some(country) = args.country.as_deref() {
        config.country = country.trim().to_lowercase();
    }
    if let Some(debug) = args.debug {
        config.debug = debug;
    }
    Ok(config)
}

fn canonical_sources(requested: &[String]) -> anyhow::Result<Vec<String>> {
    requested
        .iter()
        .map(|name| {
            ALL_SOURCES
                .iter()
                .find(|known| known.eq_ignore_ascii_case(name.trim()))
                .map(|known| known.to_string())
                .ok_or_else(|| anyhow!("unknown source {name:?}; known: {}", ALL_SOURCES.join(", ")))
        })
        .collect()
}
