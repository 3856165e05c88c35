use dia_config::DialectusConfig;
use figment::Jail;

#[test]
fn env_overrides_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("DIALECTUS_ENGINE__JUDGE_TIMEOUT_SECS", "42");
        jail.set_env("DIALECTUS_STORAGE__DATABASE_PATH", "/tmp/dia-test.db");

        let config = DialectusConfig::load(None).map_err(|e| e.to_string())?;
        assert_eq!(config.engine.judge_timeout_secs, 42);
        assert_eq!(
            config.storage.database_path,
            std::path::PathBuf::from("/tmp/dia-test.db")
        );
        Ok(())
    });
}

#[test]
fn env_beats_explicit_file() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[debate]\ntopic = \"From file\"\n")?;
        jail.set_env("DIALECTUS_DEBATE__TOPIC", "From env");

        let config = DialectusConfig::load(Some("custom.toml".as_ref()))
            .map_err(|e| e.to_string())?;
        assert_eq!(config.debate.topic, "From env");
        Ok(())
    });
}

#[test]
fn explicit_file_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_file("dialectus.toml", "[debate]\nword_limit = 100\n")?;
        jail.create_file("custom.toml", "[debate]\nword_limit = 250\n")?;

        let config = DialectusConfig::load(Some("custom.toml".as_ref()))
            .map_err(|e| e.to_string())?;
        assert_eq!(config.debate.word_limit, 250);
        Ok(())
    });
}
