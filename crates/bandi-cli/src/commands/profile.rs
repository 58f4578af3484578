//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::{default_model, default_output_dir, Config, Profile, ProviderKind};
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the profile command.
pub async fn execute_profile(
    args: ProfileArgs,
    config: &mut Config,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ProfileAction::List => list_profiles(config, formatter),
        ProfileAction::Show => show_active_profile(config, formatter),
        ProfileAction::Switch { name } => {
            switch_profile(config, name, formatter)?;
            config.save()
        }
        ProfileAction::Set {
            name,
            provider,
            endpoint,
            model,
            index,
            output,
        } => {
            let profile = Profile {
                provider: provider.into(),
                endpoint,
                model: model.unwrap_or_else(default_model),
                index_path: index,
                output_dir: output.unwrap_or_else(default_output_dir),
            };
            set_profile(config, name, profile, formatter);
            config.save()
        }
        ProfileAction::Delete { name } => {
            if delete_profile(config, &name, formatter)? {
                config.save()?;
            }
            Ok(())
        }
    }
}

/// List all profiles.
fn list_profiles(config: &Config, formatter: &Formatter) -> Result<()> {
    if config.profiles.is_empty() {
        println!("{}", formatter.info("No profiles configured"));
        return Ok(());
    }

    let mut names: Vec<&String> = config.profiles.keys().collect();
    names.sort();

    println!("Available profiles:");
    for name in names {
        let profile = &config.profiles[name];
        if name == &config.active_profile {
            println!("* {}", formatter.success(name));
        } else {
            println!("  {}", name);
        }
        print_profile(profile, "    ");
    }

    Ok(())
}

/// Show the active profile.
fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;

    println!("Active profile: {}", formatter.success(&config.active_profile));
    print_profile(profile, "  ");

    Ok(())
}

fn print_profile(profile: &Profile, indent: &str) {
    println!("{}Provider: {}", indent, provider_label(profile.provider));
    if profile.provider == ProviderKind::Ollama {
        println!("{}Model: {}", indent, profile.model);
        if let Some(endpoint) = &profile.endpoint {
            println!("{}Endpoint: {}", indent, endpoint);
        }
    }
    println!("{}Index: {}", indent, profile.index_path);
    println!("{}Records: {}", indent, profile.output_dir);
}

fn provider_label(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Ollama => "ollama",
        ProviderKind::Azure => "azure (AZURE_* environment)",
        ProviderKind::Mock => "mock",
    }
}

/// Switch to a different profile.
fn switch_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<()> {
    config.switch_profile(name.clone())?;
    println!(
        "{}",
        formatter.success(&format!("Switched to profile '{}'", name))
    );
    Ok(())
}

/// Create or update a profile.
fn set_profile(config: &mut Config, name: String, profile: Profile, formatter: &Formatter) {
    let action = if config.profiles.contains_key(&name) {
        "Updated"
    } else {
        "Created"
    };

    config.set_profile(name.clone(), profile);
    println!(
        "{}",
        formatter.success(&format!("{} profile '{}'", action, name))
    );
}

/// Delete a profile, returning whether one was removed.
fn delete_profile(config: &mut Config, name: &str, formatter: &Formatter) -> Result<bool> {
    if name == config.active_profile {
        return Err(CliError::NotPermitted(
            "Cannot delete the active profile".to_string(),
        ));
    }

    if config.profiles.remove(name).is_some() {
        println!(
            "{}",
            formatter.success(&format!("Deleted profile '{}'", name))
        );
        Ok(true)
    } else {
        println!(
            "{}",
            formatter.warning(&format!("Profile '{}' does not exist", name))
        );
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ProviderArg;
    use crate::config::OutputFormat;
    use tempfile::TempDir;

    fn mock_profile() -> Profile {
        Profile {
            provider: ProviderKind::Mock,
            endpoint: None,
            model: "mock".to_string(),
            index_path: "corpus.json".to_string(),
            output_dir: "out".to_string(),
        }
    }

    #[test]
    fn test_set_and_switch_profile() {
        let mut config = Config::default();
        let formatter = Formatter::new(OutputFormat::Table, false);

        set_profile(&mut config, "offline".to_string(), mock_profile(), &formatter);
        assert!(config.profiles.contains_key("offline"));

        switch_profile(&mut config, "offline".to_string(), &formatter).unwrap();
        assert_eq!(config.active_profile, "offline");
    }

    #[test]
    fn test_delete_active_profile() {
        let mut config = Config::default();
        let formatter = Formatter::new(OutputFormat::Table, false);

        let result = delete_profile(&mut config, "default", &formatter);
        assert!(matches!(result, Err(CliError::NotPermitted(_))));
    }

    #[test]
    fn test_delete_missing_profile() {
        let mut config = Config::default();
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(!delete_profile(&mut config, "assente", &formatter).unwrap());
    }

    #[tokio::test]
    async fn test_set_action_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::load_from(&path).unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);

        let args = ProfileArgs {
            action: ProfileAction::Set {
                name: "azure".to_string(),
                provider: ProviderArg::Azure,
                endpoint: None,
                model: None,
                index: "/data/bandi.json".to_string(),
                output: None,
            },
        };
        execute_profile(args, &mut config, &formatter).await.unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        let profile = &reloaded.profiles["azure"];
        assert_eq!(profile.provider, ProviderKind::Azure);
        assert_eq!(profile.output_dir, "records");
    }
}
