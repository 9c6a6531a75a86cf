// FILE: src/cli/handlers.rs
use crate::{
    config, lazy_load_css, LogDiagnostics, ModuleOptions, Pipeline, SassCompiler,
    PipelineError, PipelineReport, RecordingHost, Result, MANIFEST_FILE,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Instant;

// --- BUILD ---
pub fn handle_build_command(cli: &super::Cli, matches: &clap::ArgMatches) -> Result<()> {
    let options = cli.build_options(matches)?;
    let root = cli.project_root(matches);
    let manifest_path = matches
        .get_one::<PathBuf>("manifest")
        .cloned()
        .unwrap_or_else(|| root.join(options.cache_dir()).join(MANIFEST_FILE));

    if matches.get_flag("watch") {
        return watch_and_build(&options, &root, &manifest_path);
    }

    let report = build_once(&options, &root, &manifest_path)?;
    println!("   Time: {}ms", cli.elapsed_ms());

    if matches.get_flag("stats") {
        let json = serde_json::to_string_pretty(&report.stats)
            .map_err(|e| PipelineError::manifest(format!("JSON serialization error: {}", e)))?;
        println!("{}", json);
    }
    Ok(())
}

fn build_once(options: &ModuleOptions, root: &Path, manifest_path: &Path) -> Result<PipelineReport> {
    println!("🔨 Building stylesheets in {}", root.display());

    let compiler = SassCompiler::new();
    let diag = LogDiagnostics::default();
    let mut host = RecordingHost::new();

    let report = Pipeline::new(options, root, &compiler).run(&mut host, &diag)?;
    if !host.public_assets().is_empty() {
        host.write_manifest(manifest_path)?;
    }

    println!("✅ Build finished");
    println!("   Compiled: {}", report.stats.compiled);
    if report.stats.failed > 0 {
        println!("   Failed: {}", report.stats.failed);
    }
    if report.stats.empty > 0 {
        println!("   Empty: {}", report.stats.empty);
    }
    if !host.public_assets().is_empty() {
        println!("   Manifest: {}", manifest_path.display());
    }
    Ok(report)
}

fn watch_and_build(options: &ModuleOptions, root: &Path, manifest_path: &Path) -> Result<()> {
    let mut watch_paths: Vec<PathBuf> = options
        .effective_input_dir()
        .map(|dir| root.join(dir))
        .into_iter()
        .collect();
    watch_paths.extend(options.files.iter().map(|f| root.join(&f.file_path)));
    let output_root = watch_output_root(options, root)?;

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    log::error!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| watch_error("Failed to create file watcher", e))?;

    for path in &watch_paths {
        println!("👀 Watching {} for changes...", path.display());
        watcher
            .watch(path, RecursiveMode::Recursive)
            .map_err(|e| watch_error("Failed to watch path", e))?;
    }

    // Fatal errors are reported but keep the watcher alive
    if let Err(e) = build_once(options, root, manifest_path) {
        eprintln!("❌ Initial build failed: {}", e);
    }

    loop {
        match rx.recv() {
            Ok(event) => {
                if is_own_output(&event.paths, &output_root) {
                    continue;
                }
                println!("🔄 Sources changed, rebuilding...");
                let start = Instant::now();
                let diag = LogDiagnostics::default();
                let mut host = RecordingHost::new();
                match lazy_load_css(options, root, &SassCompiler::new(), &mut host, &diag) {
                    Some(report) => {
                        if let Err(e) = host.write_manifest(manifest_path) {
                            eprintln!("❌ {}", e);
                        }
                        println!(
                            "✅ Rebuilt {} file(s) in {}ms",
                            report.stats.compiled,
                            start.elapsed().as_millis()
                        );
                    }
                    None => eprintln!("❌ Rebuild failed, see log output"),
                }
            }
            Err(e) => {
                log::error!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Cache namespace as an absolute path, comparable with watcher event paths.
fn watch_output_root(options: &ModuleOptions, root: &Path) -> Result<PathBuf> {
    Ok(fs::canonicalize(root)?.join(options.cache_dir()))
}

fn is_own_output(paths: &[PathBuf], output_root: &Path) -> bool {
    paths.iter().all(|p| p.starts_with(output_root))
}

fn watch_error(context: &str, e: notify::Error) -> PipelineError {
    PipelineError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("{}: {}", context, e),
    ))
}

// --- RESOLVE ---
pub fn handle_resolve_command(cli: &super::Cli, matches: &clap::ArgMatches) -> Result<()> {
    let options = cli.build_options(matches)?;
    let root = cli.project_root(matches);
    let diag = LogDiagnostics::default();

    let files = Pipeline::new(&options, &root, &SassCompiler::new()).resolve_files(&diag)?;
    let json = serde_json::to_string_pretty(&files)
        .map_err(|e| PipelineError::manifest(format!("JSON serialization error: {}", e)))?;
    println!("{}", json);
    Ok(())
}

// --- INIT ---
pub fn handle_init_command(matches: &clap::ArgMatches) -> Result<()> {
    let dir = matches
        .get_one::<String>("dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let force = matches.get_flag("force");
    let path = init_project(&dir, force)?;

    println!("✅ Wrote {}", path.display());
    println!("\nNext steps:");
    println!("   {} build -c {}", crate::NAME, path.display());
    Ok(())
}

fn init_project(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(format!("{}.toml", crate::NAME));
    if path.exists() && !force {
        return Err(PipelineError::config(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }
    fs::create_dir_all(dir)?;
    fs::write(&path, config::starter_toml())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_project() {
        let temp_dir = TempDir::new().unwrap();
        let path = init_project(temp_dir.path(), false).unwrap();
        assert_eq!(path, temp_dir.path().join("lazycss.toml"));

        let options = config::load(&path).unwrap();
        assert_eq!(options.output_dir, "assets/css");

        assert!(init_project(temp_dir.path(), false).is_err());
        assert!(init_project(temp_dir.path(), true).is_ok());
    }

    #[test]
    fn test_watch_ignores_own_writes_with_relative_root() {
        let options = ModuleOptions {
            input_dir: Some(PathBuf::from(".")),
            ..Default::default()
        };
        let output_root = watch_output_root(&options, Path::new(".")).unwrap();
        assert!(output_root.is_absolute());

        let cwd = fs::canonicalize(std::env::current_dir().unwrap()).unwrap();
        let written = cwd.join(options.cache_dir()).join("assets/css/a.css");
        assert!(is_own_output(&[written], &output_root));

        let source = cwd.join("app/assets/scss/a.scss");
        assert!(!is_own_output(&[source], &output_root));
    }

    #[test]
    fn test_build_once_writes_manifest() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("styles")).unwrap();
        fs::write(temp_dir.path().join("styles/site.css"), "body { margin: 0 }").unwrap();

        let options = ModuleOptions {
            input_dir: Some(PathBuf::from("styles")),
            ..Default::default()
        };
        let manifest = temp_dir.path().join("out").join(MANIFEST_FILE);
        let report = build_once(&options, temp_dir.path(), &manifest).unwrap();

        assert_eq!(report.stats.compiled, 1);
        assert_eq!(report.artifacts[0].path, "assets/css/site.css");
        let content = fs::read_to_string(&manifest).unwrap();
        assert!(content.contains("assets/css/site.css"));
    }
}
