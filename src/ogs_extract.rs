
use crate::common::{parse_args, FileReader, PathArgs};
use crate::og::{read_table, GenomeRegistry};
use crate::routing::{header_regex, GenomeRouter, OutputMode, RouteOptions};
use anyhow::{Context, Result};
use env_logger::Env;
use log::{debug, info, warn};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const USAGE: &str = "
Usage:
  ogs extract [options]

Extracts sequences of Orthology Groups (OGs) from genomes (proteomes).

Mandatory options:
  -i FILE, --in=FILE        Input file containing the OGs.
  -o DIR, --out=DIR         Output directory where to place extracted sequences.
  -s PATH, --seqs=PATH      Path to the proteomes in FastA format, using '%s'
                            to denote the genome. For example:
                            /path/to/seqs/%s.faa

Other options:
  -c F, --core=F            Use only OGs present in at least this fraction of
                            the genomes. To use only the strict core genome*,
                            use -c 1. [default: 0.0]
  -d N, --duplicates=N      Use only OGs with less than this number of
                            in-paralogs in a genome. To use only genes without
                            in-paralogs*, use -d 1. [default: 0]
  -g, --per-genome          Write the output per genome instead of per OG.
  -p, --prefix              Prefix each sequence with the genome name (or the
                            OG number, if --per-genome) and a dash.
  -f, --first               Get only one gene per genome per OG (the first),
                            regardless of in-paralogs.
  -q, --quiet               Run quietly (only warnings and errors on stderr).
  -h, --help                Display this screen.

  * To use only the unus genome (OGs with exactly one gene per genome),
    use: -c 1 -d 1.
";

pub struct ExtractConfig {
	pub table: String,
	pub out_dir: String,
	pub seqs: String,
	pub core: f64,
	pub duplicates: usize,
	pub per_genome: bool,
	pub prefix: bool,
	pub first: bool,
	pub quiet: bool
}

#[derive(Debug, PartialEq)]
pub struct ExtractSummary {
	pub loaded_ogs: usize,
	pub retained_ogs: usize,
	pub files: usize,
	pub sequences: usize
}

pub fn main() {
	let args = parse_args(USAGE);
	let table = args.get_path("--in");
	let out_dir = args.get_path("--out");
	let seqs = args.get_path("--seqs");
	if table.is_empty() { error!("-i is mandatory."); }
	if out_dir.is_empty() { error!("-o is mandatory."); }
	if seqs.is_empty() { error!("-s is mandatory."); }
	if !seqs.contains("%s") {
		error!("-s must contain '%s' to denote the genome, e.g. /path/to/seqs/%s.faa.");
	}

	let config = ExtractConfig {
		table, out_dir, seqs,
		core: args.get_str("--core").parse().unwrap_or_else(
			|_| error!("F must be a fraction between 0 and 1 in --core=F.")),
		duplicates: args.get_str("--duplicates").parse().unwrap_or_else(
			|_| error!("N must be a non-negative integer in --duplicates=N.")),
		per_genome: args.get_bool("--per-genome"),
		prefix: args.get_bool("--prefix"),
		first: args.get_bool("--first"),
		quiet: args.get_bool("--quiet")
	};

	let level = if config.quiet { "warn" } else { "info" };
	env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

	if let Err(err) = run(&config) {
		error!("{:?}", err);
	}
}

fn open_output(path: &Path) -> Result<BufWriter<File>> {
	let file = File::create(path).with_context(
		|| format!("Cannot open file {} for writing.", path.display()))?;
	Ok(BufWriter::new(file))
}

pub fn run(config: &ExtractConfig) -> Result<ExtractSummary> {
	// Read the pre-computed OGs
	info!("Reading pre-computed OGs in '{}'.", config.table);
	let mut genomes = GenomeRegistry::new();
	let mut table = FileReader::open(&config.table).with_context(
		|| format!("Cannot open OG table {} for reading.", config.table))?;
	let mut collection = read_table(&mut table, &mut genomes).with_context(
		|| format!("Cannot read OG table {}.", config.table))?;
	let loaded_ogs = collection.len();
	let loaded_genes: usize = collection.ogs().iter().map(|og| og.genes().len()).sum();
	info!(" Loaded OGs: {} ({} genes).", loaded_ogs, loaded_genes);
	info!(" Reported genomes: {}.", genomes.len());

	collection.filter_core(config.core, &genomes);
	collection.remove_inparalogs(config.duplicates);
	if config.core != 0.0 || config.duplicates != 0 {
		info!(" Filtered OGs: {}.", collection.len());
	}
	if collection.is_empty() {
		warn!("No OGs left to extract.");
	}

	let options = RouteOptions {
		mode: if config.per_genome { OutputMode::PerGenome } else { OutputMode::PerOg },
		first_only: config.first,
		prefix: config.prefix
	};

	info!("Initializing output files.");
	let out_dir = Path::new(&config.out_dir);
	create_dir_all(out_dir).with_context(
		|| format!("Cannot create output directory {}.", out_dir.display()))?;
	let names: Vec<String> = match options.mode {
		OutputMode::PerGenome => genomes.iter().map(|g| format!("{}.fa", g)).collect(),
		OutputMode::PerOg => (1..=collection.len()).map(|n| format!("OG{}.fa", n)).collect()
	};
	let mut outputs = names.iter()
		.map(|name| open_output(&out_dir.join(name)))
		.collect::<Result<Vec<_>>>()?;
	info!(" Created files: {}.", outputs.len());

	info!("Filtering genes.");
	let header = header_regex();
	let mut sequences = vec![0usize; outputs.len()];
	let mut line = String::new();
	for (genome_index, genome) in genomes.iter().enumerate() {
		debug!("  Genome {}: {}", genome_index + 1, genome);
		let path = config.seqs.replace("%s", genome);
		let mut fasta = FileReader::open(&path).with_context(
			|| format!("Cannot open proteome {} of genome {}.", path, genome))?;
		let mut router = GenomeRouter::new(&collection, genome, genome_index, options, &header);

		while fasta.read_line(&mut line).with_context(
			|| format!("I/O error while reading {}.", path))? {
			let (target, text) = match router.route_line(&line) {
				Some(routed) => routed,
				None => continue
			};
			let out = &mut outputs[target];
			out.write_all(text.as_bytes())
				.and_then(|_| if text.ends_with('\n') { Ok(()) } else { out.write_all(b"\n") })
				.with_context(|| format!("Cannot write to {}.", names[target]))?;
			if text.starts_with('>') { sequences[target] += 1; }
		}

		if router.matched() < router.candidates() {
			warn!("{} of {} genes of genome {} were not found in {}.",
				router.candidates() - router.matched(), router.candidates(), genome, path);
		}
	}
	info!("  {} genomes processed.", genomes.len());

	info!("Closing output files.");
	for ((name, out), count) in names.iter().zip(outputs.iter_mut()).zip(&sequences) {
		out.flush().with_context(|| format!("Cannot write to {}.", name))?;
		debug!("  {}: {} sequences", name, count);
	}
	let total: usize = sequences.iter().sum();
	info!(" Extracted sequences: {}.", total);
	info!("Done.");

	Ok(ExtractSummary {
		loaded_ogs,
		retained_ogs: collection.len(),
		files: outputs.len(),
		sequences: total
	})
}
