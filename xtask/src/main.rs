use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Map, Value};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// DynamoDB caps a `BatchWriteItem` call at 25 put requests.
const BATCH_WRITE_LIMIT: usize = 25;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the movies API workspace",
    long_about = "A unified CLI for packaging the Lambda artifact, generating\n\
                  DynamoDB seed payloads, and running CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests, package)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Build and package the Rust Lambda artifact for Terraform inputs
    ServerlessPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
    /// Turn the seed document into BatchWriteItem request files
    SeedPayload {
        /// Seed document with `movies`, `reviews` and `cast` arrays
        #[arg(long, default_value = "seed/movies.json")]
        input: PathBuf,
        /// Directory receiving one request file per batch
        #[arg(long, default_value = "infra/dist/seed")]
        output_dir: PathBuf,
        #[arg(long, env = "MOVIES_TABLE", default_value = "Movies")]
        movies_table: String,
        #[arg(long, env = "REVIEWS_TABLE", default_value = "Reviews")]
        reviews_table: String,
        #[arg(long, env = "CAST_TABLE", default_value = "MovieCast")]
        cast_table: String,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build the Lambda zip
    Package,
    /// Run check + package
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_serverless_lambda(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);
    ensure_c_linker_available(target);

    step("Build api_runtime lambda binary");

    let mut cargo_args = vec![
        "build",
        "-p",
        "movies_api_lambda",
        "--target",
        target,
        "--bin",
        "api_runtime",
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package Terraform lambda zip artifact");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new("infra/dist");
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    let zip_path = dist_dir.join("api_runtime.zip");
    package_lambda_zip(
        &target_dir.join(binary_name("api_runtime", target)),
        &zip_path,
    );

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- serverless-package`"
        );
    }
}

fn ensure_c_linker_available(target: &str) {
    if !cfg!(windows) || !target.ends_with("unknown-linux-gnu") {
        return;
    }

    let env_override_keys = [
        format!("CC_{}", target.replace('-', "_")),
        format!("CC_{target}"),
        "TARGET_CC".to_string(),
        "CC".to_string(),
    ];

    for key in env_override_keys {
        if let Ok(value) = std::env::var(&key) {
            let candidate = value.trim();
            if candidate.is_empty() {
                continue;
            }
            if tool_works(candidate) {
                return;
            }
        }
    }

    let canonical = "x86_64-linux-gnu-gcc";
    if tool_works(canonical) {
        return;
    }

    panic!(
        "missing C cross-linker for target `{target}`. install `{canonical}` (or set CC_x86_64_unknown_linux_gnu) before running `cargo run -p xtask -- serverless-package`.\n\
         Tip: the AWS SDK crates (aws-lc-sys via rustls) require a Linux C toolchain when cross-compiling from Windows."
    );
}

fn tool_works(program: &str) -> bool {
    let mut parts = program.split_whitespace();
    let Some(bin) = parts.next() else {
        return false;
    };
    let args: Vec<&str> = parts.collect();

    Command::new(bin)
        .args(&args)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

// ── seed payloads ──────────────────────────────────────────────────

struct SeedTables<'a> {
    movies: &'a str,
    reviews: &'a str,
    cast: &'a str,
}

fn write_seed_payloads(input: &Path, output_dir: &Path, tables: SeedTables<'_>) {
    step("Generate BatchWriteItem payloads");
    let text = fs::read_to_string(input)
        .unwrap_or_else(|error| panic!("failed to read '{}': {error}", input.display()));
    let seed: Value = serde_json::from_str(&text)
        .unwrap_or_else(|error| panic!("'{}' is not valid JSON: {error}", input.display()));
    fs::create_dir_all(output_dir).expect("failed to create seed output directory");

    let mut written = Vec::new();
    for (section, table) in [
        ("movies", tables.movies),
        ("reviews", tables.reviews),
        ("cast", tables.cast),
    ] {
        let records = seed[section]
            .as_array()
            .unwrap_or_else(|| panic!("seed document has no `{section}` array"));
        for (index, payload) in batch_write_payloads(table, records).into_iter().enumerate() {
            let path = output_dir.join(format!("{section}-{index:03}.json"));
            let body = serde_json::to_string_pretty(&payload).expect("payload serializes");
            fs::write(&path, body)
                .unwrap_or_else(|error| panic!("failed to write '{}': {error}", path.display()));
            written.push(path);
        }
    }

    eprintln!("\nSeed payloads (aws dynamodb batch-write-item --request-items file://<path>):");
    for path in written {
        eprintln!("- {}", path.display());
    }
}

/// `RequestItems` documents for `table`, at most 25 puts each.
fn batch_write_payloads(table: &str, records: &[Value]) -> Vec<Value> {
    records
        .chunks(BATCH_WRITE_LIMIT)
        .map(|chunk| {
            let requests: Vec<Value> = chunk
                .iter()
                .map(|record| json!({ "PutRequest": { "Item": typed_item(record) } }))
                .collect();
            json!({ table: requests })
        })
        .collect()
}

fn typed_item(record: &Value) -> Value {
    match record {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), attribute_value(value)))
                .collect::<Map<String, Value>>(),
        ),
        other => panic!("seed record must be an object, got {other}"),
    }
}

fn attribute_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "NULL": true }),
        Value::Bool(flag) => json!({ "BOOL": flag }),
        Value::Number(number) => json!({ "N": number.to_string() }),
        Value::String(text) => json!({ "S": text }),
        Value::Array(values) => json!({ "L": values.iter().map(attribute_value).collect::<Vec<_>>() }),
        Value::Object(_) => json!({ "M": typed_item(value) }),
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test movies_api_core");
    run_cargo(&["test", "-p", "movies_api_core"]);

    step("Test movies_api_lambda");
    run_cargo(&["test", "-p", "movies_api_lambda"]);
}

fn ci_package() {
    package_serverless_lambda("x86_64-unknown-linux-gnu", BuildProfile::Release);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Package => ci_package(),
                CiJob::All => {
                    ci_check();
                    ci_package();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::ServerlessPackage { target, profile } => {
            package_serverless_lambda(&target, profile);
        }
        Commands::SeedPayload {
            input,
            output_dir,
            movies_table,
            reviews_table,
            cast_table,
        } => {
            write_seed_payloads(
                &input,
                &output_dir,
                SeedTables {
                    movies: &movies_table,
                    reviews: &reviews_table,
                    cast: &cast_table,
                },
            );
        }
    }
}
