//! The `levelcheck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use levelcheck_core::model::Section;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let banks = if bank_path.is_dir() {
        levelcheck_core::parser::load_bank_directory(&bank_path)?
    } else {
        vec![levelcheck_core::parser::parse_bank(&bank_path)?]
    };
    anyhow::ensure!(!banks.is_empty(), "no question banks found in {}", bank_path.display());

    let mut total_warnings = 0;

    for bank in &banks {
        println!(
            "Bank: {} ({} questions: {} vocabulary, {} grammar)",
            bank.name,
            bank.len(),
            bank.section_total(Section::Vocabulary),
            bank.section_total(Section::Grammar)
        );

        let warnings = levelcheck_core::parser::validate_bank(bank);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
