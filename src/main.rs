//! bedprep: genomic interval file preparation
//!
//! Usage: bedprep <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bedprep::bed::BedError;
use bedprep::commands::{CleanCommand, SortDedupCommand};
use bedprep::config::SpeciesTable;
use bedprep::interval::IntervalLayout;
use bedprep::naming::ChromNameNormalizer;
use bedprep::pipeline::{
    load_contig_index, prepare_blacklist, prepare_regulatory, split_regulatory_file,
    validate_file, BlacklistJob, RegulatoryJob,
};

#[derive(Parser)]
#[command(name = "bedprep")]
#[command(author = "Manish Kumar Bobbili")]
#[command(version)]
#[command(about = "Validate, normalize, sort and split genomic interval files against a reference", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize chromosome names and drop non-standard contigs
    Clean {
        /// Input BED/GFF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (written atomically)
        #[arg(short, long)]
        output: PathBuf,

        /// Species naming scheme (mouse or human, or one from --species-config)
        #[arg(short, long)]
        species: String,

        /// Treat the input as a blacklist (tolerate end-of-contig overflow)
        #[arg(long)]
        blacklist: bool,

        /// Keep non-standard contigs (prefix stripped) instead of dropping them
        #[arg(long)]
        keep_nonstandard: bool,

        /// Contig index to check renamed records against
        #[arg(short = 'g', long)]
        faidx: Option<PathBuf>,

        /// Read the input as GFF (columns 1,4,5); inferred from extension otherwise
        #[arg(long)]
        gff: bool,

        /// TOML file with extra species naming schemes
        #[arg(long)]
        species_config: Option<PathBuf>,
    },

    /// Sort a file into contig-index order and remove duplicate lines (in place)
    Sort {
        /// BED/GFF file to rewrite
        #[arg(short, long)]
        input: PathBuf,

        /// Contig index (.fai) defining chromosome order
        #[arg(short = 'g', long)]
        faidx: PathBuf,

        /// Keep only chrom, start and end
        #[arg(long)]
        bed3: bool,

        /// Read the input as GFF (columns 1,4,5); inferred from extension otherwise
        #[arg(long)]
        gff: bool,
    },

    /// Split a cleaned regulatory GFF into promoter.bed and enhancer.bed
    Split {
        /// Cleaned, sorted regulatory GFF
        #[arg(short, long)]
        input: PathBuf,

        /// Contig index (.fai)
        #[arg(short = 'g', long)]
        faidx: PathBuf,

        /// Directory for promoter.bed and enhancer.bed
        #[arg(short, long)]
        outdir: PathBuf,
    },

    /// Check a file against a contig index without writing anything
    Validate {
        /// BED/GFF file
        #[arg(short, long)]
        input: PathBuf,

        /// Contig index (.fai)
        #[arg(short = 'g', long)]
        faidx: PathBuf,

        /// Tolerate end-of-contig overflow
        #[arg(long)]
        blacklist: bool,
    },

    /// Clean, then sort/dedup a blacklist BED down to three columns
    Blacklist {
        /// Input blacklist BED
        #[arg(long)]
        bed: PathBuf,

        /// Species naming scheme
        #[arg(long)]
        species: String,

        /// Final blacklist BED
        #[arg(long)]
        outputfile: PathBuf,

        /// Contig index (.fai)
        #[arg(long)]
        faidx: PathBuf,

        /// Also copy the result here (file or directory)
        #[arg(long)]
        copy_to: Option<PathBuf>,

        /// TOML file with extra species naming schemes
        #[arg(long)]
        species_config: Option<PathBuf>,
    },

    /// Clean and sort a regulatory GFF, then split promoters and enhancers
    Regulatory {
        /// Input regulatory GFF
        #[arg(long)]
        gff: PathBuf,

        /// Species naming scheme
        #[arg(long)]
        species: String,

        /// Intermediate cleaned GFF (removed on success)
        #[arg(long)]
        outputfile: PathBuf,

        /// Contig index (.fai)
        #[arg(long)]
        faidx: PathBuf,

        /// Directory for promoter.bed and enhancer.bed
        #[arg(long)]
        outpath: PathBuf,

        /// Also copy both outputs into this directory
        #[arg(long)]
        copy_to: Option<PathBuf>,

        /// TOML file with extra species naming schemes
        #[arg(long)]
        species_config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("bedprep=debug,info")
        } else {
            EnvFilter::new("bedprep=info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Clean {
            input,
            output,
            species,
            blacklist,
            keep_nonstandard,
            faidx,
            gff,
            species_config,
        } => run_clean(
            input,
            output,
            species,
            blacklist,
            keep_nonstandard,
            faidx,
            gff,
            species_config,
        ),

        Commands::Sort {
            input,
            faidx,
            bed3,
            gff,
        } => run_sort(input, faidx, bed3, gff),

        Commands::Split {
            input,
            faidx,
            outdir,
        } => split_regulatory_file(&input, &faidx, &outdir).map(|counts| {
            info!("{}", counts);
        }),

        Commands::Validate {
            input,
            faidx,
            blacklist,
        } => validate_file(&input, &faidx, blacklist).map(|_| ()),

        Commands::Blacklist {
            bed,
            species,
            outputfile,
            faidx,
            copy_to,
            species_config,
        } => species_table(species_config).and_then(|species_table| {
            prepare_blacklist(&BlacklistJob {
                bed,
                species,
                output: outputfile,
                contig_index: faidx,
                copy_to,
                species_table,
            })
            .map(|_| ())
        }),

        Commands::Regulatory {
            gff,
            species,
            outputfile,
            faidx,
            outpath,
            copy_to,
            species_config,
        } => species_table(species_config).and_then(|species_table| {
            prepare_regulatory(&RegulatoryJob {
                gff,
                species,
                intermediate: outputfile,
                contig_index: faidx,
                output_dir: outpath,
                copy_to,
                species_table,
            })
            .map(|counts| info!("{}", counts))
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn species_table(config: Option<PathBuf>) -> Result<SpeciesTable, BedError> {
    match config {
        Some(path) => SpeciesTable::from_toml_file(path),
        None => Ok(SpeciesTable::default()),
    }
}

fn layout_flag(gff: bool) -> Option<IntervalLayout> {
    // Without the flag, commands infer the layout from the file extension
    gff.then_some(IntervalLayout::Gff)
}

#[allow(clippy::too_many_arguments)]
fn run_clean(
    input: PathBuf,
    output: PathBuf,
    species: String,
    blacklist: bool,
    keep_nonstandard: bool,
    faidx: Option<PathBuf>,
    gff: bool,
    species_config: Option<PathBuf>,
) -> Result<(), BedError> {
    // Species is checked before any file is opened
    let table = species_table(species_config)?;
    let normalizer =
        ChromNameNormalizer::with_table(&species, &table)?.keep_nonstandard(keep_nonstandard);
    let contigs = faidx.map(load_contig_index).transpose()?;

    let mut cmd = CleanCommand::new(normalizer);
    cmd.blacklist = blacklist;
    cmd.layout = layout_flag(gff);
    if let Some(ref contigs) = contigs {
        cmd = cmd.with_contigs(contigs);
    }
    cmd.run(&input, &output)?;
    Ok(())
}

fn run_sort(input: PathBuf, faidx: PathBuf, bed3: bool, gff: bool) -> Result<(), BedError> {
    let contigs = load_contig_index(&faidx)?;
    let mut cmd = SortDedupCommand::new(&contigs);
    cmd.project_bed3 = bed3;
    cmd.layout = layout_flag(gff);
    cmd.run(&input)?;
    Ok(())
}
