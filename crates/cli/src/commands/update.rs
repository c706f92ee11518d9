use std::path::Path;

use silt_core::{OutputEncoding, SiltResult, TargetDatabase, UpdateOptions, Updater};

/// Options collected from the `update` subcommand
pub struct UpdateArgs {
    pub changelog: String,
    pub output_directory: String,
    pub source_directory: String,
    pub output_file: String,
    pub output_encoding: String,
    pub contexts: Option<String>,
    pub labels: Option<String>,
    pub drop_first: bool,
    pub to_tag: Option<String>,
    pub database: String,
}

pub fn run(args: UpdateArgs) -> SiltResult<()> {
    // Without an output directory there is nothing to generate into.
    // Historical task behavior: skip instead of failing.
    if args.output_directory.trim().is_empty() {
        tracing::warn!("No output directory configured; skipping SQL generation");
        return Ok(());
    }
    if args.drop_first {
        tracing::warn!("--drop-first is accepted but not used by SQL generation");
    }
    if args.to_tag.is_some() {
        tracing::warn!("--to-tag is accepted but not used by SQL generation");
    }

    let updater = Updater::from_file(Path::new(&args.changelog))?;

    let mut opts = UpdateOptions::new(&args.output_directory, args.source_directory);
    opts.output_file = args.output_file;
    opts.output_encoding = OutputEncoding::parse(&args.output_encoding)?;
    opts.contexts = split_expressions(args.contexts);
    opts.labels = split_expressions(args.labels);
    opts.drop_first = args.drop_first;
    opts.to_tag = args.to_tag;
    opts.database = TargetDatabase {
        name: args.database,
    };

    let report = updater.update_with_directory_grouping(&opts)?;

    println!(
        "Wrote {} SQL file(s) from {} changeset(s) ({} skipped)",
        report.files_written.len(),
        report.visited + report.skipped,
        report.skipped
    );
    for file in &report.files_written {
        println!("  {}", file.display());
    }
    Ok(())
}

fn split_expressions(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn base_args() -> UpdateArgs {
        UpdateArgs {
            changelog: "changelog.yaml".to_string(),
            output_directory: String::new(),
            source_directory: String::new(),
            output_file: "update.sql".to_string(),
            output_encoding: "UTF-8".to_string(),
            contexts: None,
            labels: None,
            drop_first: false,
            to_tag: None,
            database: "offline".to_string(),
        }
    }

    #[test]
    fn expressions_split_on_commas_and_drop_blanks() {
        assert_eq!(
            split_expressions(Some("prod, dev ,,staging".to_string())),
            vec!["prod", "dev", "staging"]
        );
        assert!(split_expressions(None).is_empty());
    }

    #[test]
    fn empty_output_directory_is_a_no_op() {
        // No changelog file exists; the command must return before trying
        // to load one.
        let args = base_args();
        run(args).expect("expected silent no-op");
    }

    #[test]
    fn update_generates_per_directory_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source_root = dir.path().join("service-a");
        fs::create_dir_all(source_root.join("db/v1")).expect("mkdir");
        fs::write(
            source_root.join("changelog.yaml"),
            "include:\n  - path: db/v1/tables.yaml\n",
        )
        .expect("write master");
        fs::write(
            source_root.join("db/v1/tables.yaml"),
            "changesets:\n  - id: one\n    author: ops\n    sql: CREATE TABLE a (id INT)\n",
        )
        .expect("write changesets");

        let output_root = dir.path().join("out");
        let mut args = base_args();
        args.changelog = source_root.join("changelog.yaml").display().to_string();
        args.output_directory = output_root.display().to_string();
        args.source_directory = source_root.display().to_string();
        run(args).expect("run failed");

        let generated = output_root.join("service-a/db/v1/update.sql");
        let sql = fs::read_to_string(&generated).expect("generated file");
        assert!(sql.contains("CREATE TABLE a (id INT);"));
    }
}
