use crate::cli::{MatchArgs, SymmetryArg};
use crate::error::Result;
use crate::io;
use smirkff::core::forcefield::ruleset::RuleSet;
use smirkff::core::models::molecule::Molecule;
use smirkff::core::smirks::{MatchSymmetry, Matcher, Pattern, Replacements, parse_smirks_with};
use tracing::{info, warn};

pub fn run(args: MatchArgs) -> Result<()> {
    let replacements = match &args.forcefield {
        Some(path) => RuleSet::load(path)?.replacements().clone(),
        None => Replacements::new(),
    };
    let pattern = parse_smirks_with(&args.smirks, &replacements)?;
    info!(
        atoms = pattern.atom_count(),
        tags = pattern.tag_count(),
        "Pattern compiled."
    );

    for record in io::read_molecules(&args.input)? {
        let molecule = match Molecule::try_from(&record) {
            Ok(molecule) => molecule,
            Err(e) => {
                warn!(molecule = %record.name, error = %e, "Skipping malformed molecule.");
                continue;
            }
        };
        let found = find_matches(&pattern, &molecule, args.symmetry.into());
        println!("{}: {} match(es)", molecule.name(), found.len());
        for atoms in found {
            println!("  {atoms:?}");
        }
    }
    Ok(())
}

impl From<SymmetryArg> for MatchSymmetry {
    fn from(arg: SymmetryArg) -> Self {
        match arg {
            SymmetryArg::Exact => MatchSymmetry::Exact,
            SymmetryArg::Reversible => MatchSymmetry::Reversible,
            SymmetryArg::CenterAnchored => MatchSymmetry::CenterAnchored,
        }
    }
}

fn find_matches(
    pattern: &Pattern,
    molecule: &Molecule,
    symmetry: MatchSymmetry,
) -> Vec<Vec<usize>> {
    let mut found: Vec<_> = Matcher::new(pattern, molecule)
        .symmetry(symmetry)
        .matches()
        .collect();
    found.sort();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use smirkff::core::models::atom::Atom;
    use smirkff::core::models::bond::BondOrder;
    use std::fs;
    use tempfile::tempdir;

    fn water() -> Molecule {
        let mut b = Molecule::builder("water");
        let o = b.add_atom(Atom::new(8));
        let h1 = b.add_atom(Atom::new(1));
        let h2 = b.add_atom(Atom::new(1));
        b.bond(o, h1, BondOrder::Single);
        b.bond(o, h2, BondOrder::Single);
        b.build().unwrap()
    }

    #[test]
    fn symmetry_collapses_reversed_angles() {
        let pattern = parse_smirks_with("[#1:1]-[#8:2]-[#1:3]", &Replacements::new()).unwrap();
        assert_eq!(
            find_matches(&pattern, &water(), MatchSymmetry::Exact),
            vec![vec![1, 0, 2], vec![2, 0, 1]]
        );
        assert_eq!(
            find_matches(&pattern, &water(), MatchSymmetry::Reversible),
            vec![vec![1, 0, 2]]
        );
    }

    #[test]
    fn replacements_come_from_forcefield_file() {
        let dir = tempdir().unwrap();
        let ff = dir.path().join("ff.toml");
        fs::write(&ff, "[replacements]\nhydroxyl = \"[#8]-[#1]\"\n").unwrap();
        let input = dir.path().join("mols.toml");
        fs::write(
            &input,
            "[[molecules]]\nname = \"water\"\natoms = [{ element = \"O\" }, { element = \"H\" }, { element = \"H\" }]\nbonds = [{ atoms = [0, 1] }, { atoms = [0, 2] }]\n",
        )
        .unwrap();

        let args = MatchArgs {
            smirks: "[$hydroxyl:1]".to_string(),
            input,
            forcefield: Some(ff),
            symmetry: SymmetryArg::Exact,
        };
        assert!(run(args).is_ok());
    }

    #[test]
    fn unknown_replacement_is_an_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("mols.toml");
        fs::write(&input, "").unwrap();
        let args = MatchArgs {
            smirks: "[$missing:1]".to_string(),
            input,
            forcefield: None,
            symmetry: SymmetryArg::Exact,
        };
        assert!(matches!(run(args), Err(crate::error::CliError::Pattern(_))));
    }
}
