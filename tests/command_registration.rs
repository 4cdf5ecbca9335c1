use std::collections::HashSet;

use gw2_community_bot::commands;

#[test]
fn test_all_commands_returns_correct_count() {
    let cmds = commands::all();
    assert_eq!(
        cmds.len(),
        18,
        "Expected 18 commands (9 gw2 + 9 community/moderation/fun), got {}",
        cmds.len()
    );
}

#[test]
fn test_all_commands_contain_expected_names() {
    let cmds = commands::all();
    let names: HashSet<&str> = cmds.iter().map(|cmd| cmd.name.as_str()).collect();

    let expected = [
        "help",
        // GW2
        "price",
        "tpfee",
        "materials",
        "apikey",
        "account",
        "wallet",
        "achievements",
        "wiki",
        "fractals",
        // Community
        "remind",
        "rolereact",
        "custom",
        // Moderation
        "purge",
        "antispam",
        // Fun
        "coinflip",
        "roll",
        "8ball",
    ];

    for name in &expected {
        assert!(
            names.contains(name),
            "Expected command '{}' not found in commands::all(). Present names: {:?}",
            name,
            names
        );
    }
}

#[test]
fn test_subcommands_registered() {
    let cmds = commands::all();
    let subcommands = |parent: &str| -> Vec<String> {
        cmds.iter()
            .find(|c| c.name == parent)
            .map(|c| c.subcommands.iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default()
    };

    assert_eq!(subcommands("apikey"), ["add", "list", "switch", "remove"]);
    assert_eq!(subcommands("remind"), ["me", "user", "list", "remove"]);
    assert_eq!(subcommands("rolereact"), ["add", "remove", "list"]);
    assert_eq!(subcommands("custom"), ["add", "remove", "list"]);
    assert_eq!(
        subcommands("antispam"),
        ["show", "enable", "disable", "set", "exempt-role", "exempt-channel"]
    );
}

#[test]
fn test_moderation_commands_require_permissions() {
    let cmds = commands::all();
    for name in ["purge", "antispam", "rolereact"] {
        let cmd = cmds.iter().find(|c| c.name == name).unwrap();
        assert!(
            !cmd.required_permissions.is_empty(),
            "Command '{name}' must require permissions"
        );
        assert!(cmd.guild_only, "Command '{name}' must be guild only");
    }
}

#[test]
fn test_no_duplicate_command_names() {
    let cmds = commands::all();
    let mut seen = HashSet::new();

    for cmd in &cmds {
        assert!(
            seen.insert(cmd.name.as_str()),
            "Duplicate command name found: '{}'",
            cmd.name
        );
    }
}

#[test]
fn test_all_commands_are_slash_commands() {
    let cmds = commands::all();

    for cmd in &cmds {
        assert!(
            cmd.slash_action.is_some(),
            "Command '{}' does not have slash_action set (not a slash command)",
            cmd.name
        );
    }
}
