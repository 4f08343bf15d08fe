// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use modpatch::{
    ArchiveOutcome, Batch, BatchOptions, InstallerOptions, Jdk, JdkToolchain, LinkOptions,
    ModulePath, TargetVersion,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "modpatch")]
#[command(author, version, about = "Retrofits legacy jars with synthesized module descriptors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch every non-modular jar in a directory with a synthesized module descriptor
    Patch {
        /// Directory of jar archives forming the module path
        module_path: PathBuf,
        /// Target runtime version for multi-release resolution (default: the JDK's own version)
        #[arg(short = 'r', long)]
        multi_release: Option<u32>,
        /// Note unresolved dependencies instead of failing generation
        #[arg(long)]
        ignore_missing_deps: bool,
        /// Number of archives to process in parallel (default: available cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Link patched modules into an executable runtime image
    Link {
        /// Directory of jar archives forming the module path
        module_path: PathBuf,
        /// Root module to resolve the image from
        #[arg(short, long)]
        module: String,
        /// Output directory of the runtime image
        #[arg(short, long, default_value = "image")]
        output: PathBuf,
        /// Launcher spec (name=module/mainclass)
        #[arg(long)]
        launcher: Option<String>,
        /// Skip signature verification of signed jars
        #[arg(long)]
        ignore_signing_information: bool,
        /// Extra options passed through to jlink
        #[arg(long = "jlink-option")]
        jlink_options: Vec<String>,
    },
    /// Package a runtime image into an OS-specific installer
    Package {
        /// Application name
        #[arg(long)]
        name: String,
        /// Main module of the application
        #[arg(short, long)]
        module: String,
        /// Fully qualified main class inside the module
        #[arg(long)]
        main_class: String,
        /// Runtime image to wrap
        #[arg(long, default_value = "image")]
        runtime_image: PathBuf,
        /// Destination directory of the installer artifact
        #[arg(short, long, default_value = ".")]
        dest: PathBuf,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        app_version: Option<String>,
        #[arg(long)]
        copyright: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        icon: Option<PathBuf>,
        #[arg(long)]
        license_file: Option<PathBuf>,
        /// Options passed to the bundled JVM at application launch
        #[arg(long)]
        java_options: Option<String>,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Patch {
            module_path,
            multi_release,
            ignore_missing_deps,
            jobs,
        } => cmd_patch(module_path, multi_release, ignore_missing_deps, jobs),
        Commands::Link {
            module_path,
            module,
            output,
            launcher,
            ignore_signing_information,
            jlink_options,
        } => {
            let jdk = Jdk::discover()?;
            let toolchain = JdkToolchain::new(jdk.clone());
            let mp = ModulePath::for_batch(Some(jdk.jmods()), &module_path);
            modpatch::link(
                &toolchain,
                &mp,
                &LinkOptions {
                    module,
                    output,
                    launcher,
                    ignore_signing_information,
                    extra_options: jlink_options,
                },
            )?;
            Ok(())
        }
        Commands::Package {
            name,
            module,
            main_class,
            runtime_image,
            dest,
            vendor,
            app_version,
            copyright,
            description,
            icon,
            license_file,
            java_options,
        } => {
            let jdk = Jdk::discover()?;
            let toolchain = JdkToolchain::new(jdk);
            modpatch::package(
                &toolchain,
                &InstallerOptions {
                    name,
                    module,
                    main_class,
                    runtime_image,
                    dest,
                    vendor,
                    app_version,
                    copyright,
                    description,
                    icon,
                    license_file,
                    java_options,
                },
            )?;
            Ok(())
        }
    }
}

/// Run the patch batch and print the per-archive report.
///
/// Exit code is 0 whenever the batch itself completed, even if individual
/// archives failed; those are reported, not escalated.
fn cmd_patch(
    module_path: PathBuf,
    multi_release: Option<u32>,
    ignore_missing_deps: bool,
    jobs: Option<usize>,
) -> Result<()> {
    let jdk = Jdk::discover()?;

    let target = match multi_release {
        Some(version) => TargetVersion(version),
        None => TargetVersion(jdk.release_major()?),
    };
    info!("target runtime version {}", target);

    let toolchain = JdkToolchain::new(jdk.clone());
    let mut options = BatchOptions::new(target);
    options.platform_modules = Some(jdk.jmods());
    options.ignore_missing_deps = ignore_missing_deps;
    options.jobs = jobs;

    let outcomes = Batch::new(&toolchain).run(&module_path, &options)?;

    let mut skipped = 0;
    let mut patched = 0;
    let mut failed = 0;
    for (name, outcome) in &outcomes {
        match outcome {
            ArchiveOutcome::Skipped => {
                skipped += 1;
                println!("  {name}: already modular");
            }
            ArchiveOutcome::Patched(count) => {
                patched += 1;
                println!("  {name}: patched ({count} descriptor(s) injected)");
            }
            ArchiveOutcome::Failed(error) => {
                failed += 1;
                println!("  {name}: FAILED: {error}");
            }
        }
    }
    println!(
        "{} archive(s): {} patched, {} already modular, {} failed",
        outcomes.len(),
        patched,
        skipped,
        failed
    );

    Ok(())
}
