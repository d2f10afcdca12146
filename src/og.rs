
use crate::common::FileReader;
use anyhow::{bail, Result};
use itertools::Itertools;
use smartstring::alias::String as SmartString;
use std::collections::HashMap;

// Cell contents meaning "no gene of this genome in the OG".
const ABSENT: &str = "-";
const GENE_SEPARATOR: char = ',';

// Core fractions below 1 are compared at the two decimals they are typed
// with, so 0.67 selects two of three genomes.
const CORE_PRECISION: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
	pub genome: SmartString,
	pub id: SmartString
}

impl Gene {
	pub fn new(genome: &str, id: &str, genomes: &mut GenomeRegistry) -> Gene {
		genomes.register(genome);
		Gene { genome: genome.into(), id: id.into() }
	}
}

/// Distinct genome names in the order they were first seen.
#[derive(Debug, Default)]
pub struct GenomeRegistry {
	names: Vec<SmartString>
}

impl GenomeRegistry {
	pub fn new() -> GenomeRegistry { GenomeRegistry::default() }

	pub fn register(&mut self, name: &str) -> usize {
		match self.index_of(name) {
			Some(index) => index,
			None => { self.names.push(name.into()); self.names.len() - 1 }
		}
	}

	pub fn index_of(&self, name: &str) -> Option<usize> {
		self.names.iter().position(|n| n.as_str() == name)
	}

	pub fn len(&self) -> usize { self.names.len() }
	pub fn is_empty(&self) -> bool { self.names.is_empty() }

	pub fn iter(&self) -> impl Iterator<Item=&str> {
		self.names.iter().map(|n| n.as_str())
	}
}

/// Orthology group: the genes of one table row, in column order.
#[derive(Debug, Clone, Default)]
pub struct Og {
	genes: Vec<Gene>
}

impl Og {
	pub fn from_row(header: &[&str], cells: &[&str], genomes: &mut GenomeRegistry) -> Og {
		let mut genes = Vec::new();
		// Missing trailing cells are absent genes; cells beyond the header are ignored.
		for (genome, cell) in header.iter().zip(cells) {
			let cell = cell.trim();
			if cell.is_empty() || cell == ABSENT { continue; }
			for id in cell.split(GENE_SEPARATOR).map(str::trim) {
				if id.is_empty() { continue; }
				genes.push(Gene::new(genome, id, genomes));
			}
		}
		Og { genes }
	}

	pub fn genes(&self) -> &[Gene] { &self.genes }

	pub fn genome_genes(&self, genome: &str) -> Vec<&Gene> {
		self.genes.iter().filter(|g| g.genome.as_str() == genome).collect()
	}

	/// Number of distinct genomes with at least one gene in the group.
	pub fn genome_count(&self) -> usize {
		self.genes.iter().map(|g| &g.genome).unique().count()
	}

	/// Largest number of genes contributed by a single genome.
	pub fn max_copies(&self) -> usize {
		let mut copies: HashMap<&str, usize> = HashMap::new();
		for gene in &self.genes {
			*copies.entry(gene.genome.as_str()).or_insert(0) += 1;
		}
		copies.values().cloned().max().unwrap_or(0)
	}
}

#[derive(Debug, Default)]
pub struct OgCollection {
	ogs: Vec<Og>
}

impl OgCollection {
	pub fn new() -> OgCollection { OgCollection::default() }

	pub fn push(&mut self, og: Og) { self.ogs.push(og); }
	pub fn len(&self) -> usize { self.ogs.len() }
	pub fn is_empty(&self) -> bool { self.ogs.is_empty() }
	pub fn ogs(&self) -> &[Og] { &self.ogs }

	/// Keeps only OGs present in at least `min_fraction` of all registered
	/// genomes. A fraction of 0.0 disables the filter, 1.0 or more requires
	/// every genome.
	pub fn filter_core(&mut self, min_fraction: f64, genomes: &GenomeRegistry) {
		if min_fraction == 0.0 || genomes.is_empty() { return; }
		let total = genomes.len() as f64;
		self.ogs.retain(|og| {
			let fraction = og.genome_count() as f64 / total;
			fraction >= min_fraction || (min_fraction < 1.0 &&
				(fraction * CORE_PRECISION).round() / CORE_PRECISION >= min_fraction)
		});
	}

	/// Drops every OG in which some genome contributes more than
	/// `max_copies` genes. Zero disables the filter.
	pub fn remove_inparalogs(&mut self, max_copies: usize) {
		if max_copies == 0 { return; }
		self.ogs.retain(|og| og.max_copies() <= max_copies);
	}

	/// For every OG, in collection order, the genes belonging to `genome`.
	pub fn genome_genes(&self, genome: &str) -> Vec<Vec<&Gene>> {
		self.ogs.iter().map(|og| og.genome_genes(genome)).collect()
	}
}

fn split_row(line: &str) -> Vec<&str> {
	line.trim_end_matches(&['\n', '\r'][..]).split('\t').collect()
}

/// Reads an OG table: a header row of genome names followed by one row per
/// OG. Every header genome is registered, even if it never has a gene.
pub fn read_table(table: &mut FileReader, genomes: &mut GenomeRegistry) -> Result<OgCollection> {
	let mut line = String::new();
	if !table.read_line(&mut line)? {
		bail!("OG table is empty, expected a header row of genome names.");
	}
	let header_line = line.clone();
	let header = split_row(&header_line);
	for genome in &header { genomes.register(genome); }

	let mut collection = OgCollection::new();
	while table.read_line(&mut line)? {
		if line.trim().is_empty() { continue; }
		collection.push(Og::from_row(&header, &split_row(&line), genomes));
	}
	Ok(collection)
}
