//! Pipeline performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lazycss::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_sources(root: &Path, count: usize) {
    let dir = root.join("styles");
    fs::create_dir_all(dir.join("nested")).unwrap();
    for i in 0..count {
        let sub = if i % 2 == 0 { "" } else { "nested" };
        fs::write(
            dir.join(sub).join(format!("s{}.css", i)),
            format!(".item-{} {{ color: red; margin: 0 {}px; }}\n", i, i),
        )
        .unwrap();
    }
}

fn bench_file_set(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    write_sources(temp_dir.path(), 500);

    let global = RuleSet::new().with(Rule::width_lt(600));
    let explicit: Vec<_> = (0..50)
        .map(|i| SourceFileSpec::new(format!("styles/s{}.css", i * 2)))
        .collect();
    let diag = CapturedDiagnostics::new();

    c.bench_function("file_set_500", |b| {
        b.iter(|| {
            FileSetBuilder::new(temp_dir.path(), &global)
                .build(black_box(&explicit), Some(Path::new("styles")), &diag)
                .unwrap()
        })
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    write_sources(temp_dir.path(), 100);

    let options = ModuleOptions {
        input_dir: Some(PathBuf::from("styles")),
        width_gt: Some(ScreenSize { width: 1024 }),
        ..Default::default()
    };
    let compiler = SassCompiler::new();

    c.bench_function("pipeline_100", |b| {
        b.iter(|| {
            let mut host = RecordingHost::new();
            Pipeline::new(black_box(&options), temp_dir.path(), &compiler)
                .run(&mut host, &CapturedDiagnostics::new())
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_file_set, bench_full_pipeline);
criterion_main!(benches);
