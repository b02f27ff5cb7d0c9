use super::*;
use std::path::Path;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_get_defaults() {
    let cli = parse(&["cmux", "get", "https://example.com/a.iso", "https://example.com/b.iso"]);
    assert!(cli.config.is_none());
    match cli.command {
        CliCommand::Get {
            urls,
            name,
            priority,
            fetch,
        } => {
            assert_eq!(urls.len(), 2);
            assert_eq!(name, "get");
            assert_eq!(priority, 1.0);
            assert_eq!(fetch.threads, None);
            assert_eq!(fetch.output_dir, Path::new("."));
            assert!(!fetch.json);
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_with_options() {
    let cli = parse(&[
        "cmux", "get", "-j", "4", "-o", "/tmp/out", "--json", "--name", "isos", "--priority", "2.5",
        "https://example.com/a.iso",
    ]);
    match cli.command {
        CliCommand::Get {
            urls,
            name,
            priority,
            fetch,
        } => {
            assert_eq!(urls, vec!["https://example.com/a.iso".to_string()]);
            assert_eq!(name, "isos");
            assert_eq!(priority, 2.5);
            assert_eq!(fetch.threads, Some(4));
            assert_eq!(fetch.output_dir, Path::new("/tmp/out"));
            assert!(fetch.json);
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_get_requires_url() {
    assert!(Cli::try_parse_from(["cmux", "get"]).is_err());
}

#[test]
fn cli_parse_run_with_global_config() {
    let cli = parse(&["cmux", "run", "jobs.toml", "--config", "/etc/cmux.toml", "--threads", "2"]);
    assert_eq!(cli.config.as_deref(), Some(Path::new("/etc/cmux.toml")));
    match cli.command {
        CliCommand::Run { manifest, fetch } => {
            assert_eq!(manifest, Path::new("jobs.toml"));
            assert_eq!(fetch.threads, Some(2));
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_rejects_zero_threads() {
    assert!(Cli::try_parse_from(["cmux", "get", "-j", "0", "https://example.com/a"]).is_err());
    assert!(Cli::try_parse_from(["cmux", "run", "jobs.toml", "--threads", "0"]).is_err());
    assert!(Cli::try_parse_from(["cmux", "run", "jobs.toml", "--threads", "1"]).is_ok());
}

#[test]
fn cli_parse_checksum() {
    match parse(&["cmux", "checksum", "/tmp/file.iso"]).command {
        CliCommand::Checksum { path } => assert_eq!(path, Path::new("/tmp/file.iso")),
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["cmux", "add", "https://example.com/x"]).is_err());
}
