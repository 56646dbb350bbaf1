use clap::CommandFactory;

use super::*;

#[test]
fn identity_commands_parse_without_gateway_wrapper() {
    let cli = Cli::try_parse_from(["shiftboard", "identity", "set", "a@b.com"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Identity(IdentityCommand { command: IdentitySubcommand::Set { ref email } }) if email == "a@b.com"
    ));
}

#[test]
fn gateway_commands_sit_at_the_top_level() {
    let cli = Cli::try_parse_from(["shiftboard", "clock-in"]).unwrap();
    assert!(matches!(cli.command, Command::Gateway(GatewayCommand::ClockIn)));

    let cli = Cli::try_parse_from(["shiftboard", "--no-prompt", "call", "getGoals", "--get"]).unwrap();
    assert!(cli.no_prompt);
    assert!(matches!(cli.command, Command::Gateway(GatewayCommand::Call(CallArgs { ref action, get: true, .. })) if action == "getGoals"));
}

#[test]
fn gateway_and_identity_names_do_not_collide() {
    Cli::command().debug_assert();
}
