use super::*;
use crate::project_identity;
use clap::CommandFactory;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec![project_identity::BINARY_NAME];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("arguments should parse")
}

#[test]
fn build_accepts_deploy_variants() {
    let cli = parse(&["build", "force-deploy"]);
    assert!(matches!(
        cli.command,
        Some(Command::Build {
            deploy: Some(BuildDeploy::ForceDeploy)
        })
    ));

    let cli = parse(&["build"]);
    assert!(matches!(cli.command, Some(Command::Build { deploy: None })));
}

#[test]
fn build_rejects_unknown_second_argument() {
    let parsed = Cli::try_parse_from([project_identity::BINARY_NAME, "build", "publish"]);
    assert!(parsed.is_err());
}

#[test]
fn deploy_accepts_force_and_force_deploy() {
    for word in ["force", "force-deploy"] {
        let cli = parse(&["deploy", word]);
        assert!(matches!(
            cli.command,
            Some(Command::Deploy {
                mode: Some(DeployArg::Force)
            })
        ));
    }
}

#[test]
fn deploy_prod_short_activate_flag() {
    let cli = parse(&["deploy-prod", "-a"]);
    assert!(matches!(
        cli.command,
        Some(Command::DeployProd { activate: true })
    ));
}

#[test]
fn test_passes_hyphenated_arguments_through() {
    let cli = parse(&["test", "--coverage", "--verbose", "src/app"]);
    match cli.command {
        Some(Command::Test { args }) => {
            assert_eq!(args, vec!["--coverage", "--verbose", "src/app"]);
        }
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(!cli.global.verbose);
}

#[test]
fn unknown_script_is_captured_not_rejected() {
    let cli = parse(&["publish", "now"]);
    match cli.command {
        Some(Command::External(raw)) => assert_eq!(raw, vec!["publish", "now"]),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn global_flags_are_forwarded_in_order() {
    let cli = parse(&["--verbose", "--quiet", "zip"]);
    assert_eq!(cli.global.forwarded(), vec!["--verbose", "--quiet"]);
    assert!(parse(&["zip"]).global.forwarded().is_empty());
}

#[test]
fn build_steps_are_hidden_from_help() {
    let mut out = Vec::new();
    Cli::command()
        .write_long_help(&mut out)
        .expect("can render help");
    let help = String::from_utf8(out).expect("help is valid utf8");

    assert!(help.contains("setup-dev-properties"));
    assert!(help.contains("deploy-prod"));
    assert!(!help.contains("transpile"));
    assert!(!help.contains("cleanup"));
}

#[test]
fn build_deploy_maps_to_deploy_mode() {
    assert_eq!(BuildDeploy::Deploy.mode(), DeployMode::Normal);
    assert_eq!(BuildDeploy::ForceDeploy.mode(), DeployMode::Force);
}
