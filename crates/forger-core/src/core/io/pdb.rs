//! PDB text-format reader and writer.
//!
//! Only coordinate records (`ATOM`, `HETATM`), chain terminators (`TER`),
//! and the crystal box line (`CRYST1`) are interpreted; every other record
//! type is ignored on input and never emitted on output. Atom and residue
//! order is preserved exactly, so identical structures serialize to
//! byte-identical files.

use super::traits::StructureFile;
use crate::core::models::{Atom, Residue, ResidueKind, Structure};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed PDB record on line {line_number}: {message}")]
    MalformedRecord { line_number: usize, message: String },

    #[error("no coordinate records found; not a PDB structure")]
    NoAtoms,
}

/// Header information carried through a PDB read/write round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    /// The raw `CRYST1` line describing the periodic box, if present.
    /// Solvated structures carry one; stripped structures usually do not
    /// need it but keeping it is harmless.
    pub cryst1: Option<String>,
}

/// Reader/writer for the PDB file format.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Structure, Self::Metadata), Self::Error> {
        let mut structure = Structure::new();
        let mut metadata = PdbMetadata::default();
        let mut current: Option<Residue> = None;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;

            if line.starts_with("CRYST1") {
                metadata.cryst1 = Some(line.trim_end().to_string());
                continue;
            }
            if line.starts_with("END") {
                break;
            }
            if !line.starts_with("ATOM  ") && !line.starts_with("HETATM") {
                continue;
            }

            let record = CoordRecord::parse(&line, line_number)?;
            let same_residue = current.as_ref().is_some_and(|res| {
                res.chain_id == record.chain_id
                    && res.seq_number == record.seq_number
                    && res.insertion_code == record.insertion_code
                    && res.name == record.residue_name
            });

            if !same_residue {
                if let Some(done) = current.take() {
                    structure.push_residue(done);
                }
                let mut residue =
                    Residue::new(&record.residue_name, record.chain_id, record.seq_number);
                residue.insertion_code = record.insertion_code;
                current = Some(residue);
            }

            if let Some(res) = current.as_mut() {
                res.atoms.push(record.atom);
            }
        }

        if let Some(done) = current.take() {
            structure.push_residue(done);
        }

        if structure.is_empty() {
            return Err(PdbError::NoAtoms);
        }
        Ok((structure, metadata))
    }

    fn write_to(
        structure: &Structure,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        if let Some(cryst1) = &metadata.cryst1 {
            writeln!(writer, "{}", cryst1)?;
        }

        let mut serial: usize = 1;
        let residues: Vec<&Residue> = structure.residues().collect();

        for (i, res) in residues.iter().enumerate() {
            let record_name = if res.kind == ResidueKind::AminoAcid {
                "ATOM  "
            } else {
                "HETATM"
            };

            for atom in &res.atoms {
                writeln!(
                    writer,
                    "{}{:>5} {} {:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                    record_name,
                    serial % 100_000,
                    format_atom_name(&atom.name),
                    res.name,
                    res.chain_id,
                    res.seq_number,
                    res.insertion_code.unwrap_or(' '),
                    atom.position.x,
                    atom.position.y,
                    atom.position.z,
                    atom.occupancy,
                    atom.b_factor,
                    atom.element
                )?;
                serial += 1;
            }

            // TER closes each protein chain, matching what repair tools emit.
            let chain_ends = res.kind == ResidueKind::AminoAcid
                && residues.get(i + 1).is_none_or(|next| {
                    next.chain_id != res.chain_id || next.kind != ResidueKind::AminoAcid
                });
            if chain_ends {
                writeln!(
                    writer,
                    "TER   {:>5}      {:>3} {}{:>4}",
                    serial % 100_000,
                    res.name,
                    res.chain_id,
                    res.seq_number
                )?;
                serial += 1;
            }
        }

        writeln!(writer, "END")?;
        Ok(())
    }
}

/// One parsed `ATOM`/`HETATM` line.
struct CoordRecord {
    atom: Atom,
    residue_name: String,
    chain_id: char,
    seq_number: isize,
    insertion_code: Option<char>,
}

impl CoordRecord {
    fn parse(line: &str, line_number: usize) -> Result<Self, PdbError> {
        let malformed = |message: &str| PdbError::MalformedRecord {
            line_number,
            message: message.to_string(),
        };

        if line.len() < 54 {
            return Err(malformed("coordinate record shorter than 54 columns"));
        }

        let chars: Vec<char> = line.chars().collect();
        let column = |range: std::ops::Range<usize>| -> String {
            chars[range.start.min(chars.len())..range.end.min(chars.len())]
                .iter()
                .collect::<String>()
                .trim()
                .to_string()
        };

        let name = column(12..16);
        let residue_name = column(17..20);
        if name.is_empty() || residue_name.is_empty() {
            return Err(malformed("missing atom or residue name"));
        }

        let chain_id = chars.get(21).copied().unwrap_or(' ');
        let seq_number = column(22..26)
            .parse::<isize>()
            .map_err(|_| malformed("invalid residue sequence number"))?;
        let insertion_code = chars.get(26).copied().filter(|c| !c.is_whitespace());

        let coord = |range: std::ops::Range<usize>, axis: &str| -> Result<f64, PdbError> {
            column(range)
                .parse::<f64>()
                .map_err(|_| malformed(&format!("invalid {} coordinate", axis)))
        };
        let x = coord(30..38, "x")?;
        let y = coord(38..46, "y")?;
        let z = coord(46..54, "z")?;

        let occupancy = column(54..60).parse::<f64>().unwrap_or(1.0);
        let b_factor = column(60..66).parse::<f64>().unwrap_or(0.0);
        let element = column(76..78);

        let mut atom = Atom::new(&name, &element, Point3::new(x, y, z));
        atom.occupancy = occupancy;
        atom.b_factor = b_factor;

        Ok(Self {
            atom,
            residue_name,
            chain_id,
            seq_number,
            insertion_code,
        })
    }
}

/// Lays an atom name out in PDB columns 13-16: names shorter than four
/// characters are indented by one column unless they start with a digit.
fn format_atom_name(name: &str) -> String {
    if name.len() >= 4 || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{:<4}", name)
    } else {
        format!(" {:<3}", name)
    }
}
