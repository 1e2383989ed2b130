use agent_stream::{filter_env, AgentConfig};
use pretty_assertions::assert_eq;

fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect()
}

#[test]
fn filter_env_removes_exactly_the_deny_listed_markers() {
    let config = AgentConfig::default();
    let input = pairs(&[
        ("PATH", "/usr/bin"),
        ("CLAUDECODE", "1"),
        ("HOME", "/home/dev"),
        ("CLAUDE_SESSION_ID", "s-123"),
        ("TERM", "xterm-256color"),
        ("CLAUDE_CODE_ENTRYPOINT", "cli"),
    ]);

    let filtered = filter_env(input, &config.env_deny_list);
    assert_eq!(
        filtered,
        pairs(&[
            ("PATH", "/usr/bin"),
            ("HOME", "/home/dev"),
            ("TERM", "xterm-256color"),
        ])
    );
}

#[test]
fn filter_env_keeps_near_miss_names_intact() {
    let deny = vec!["CLAUDECODE".to_string()];
    let input = pairs(&[("CLAUDECODE_EXTRA", "x"), ("XCLAUDECODE", "y")]);
    let filtered = filter_env(input.clone(), &deny);
    assert_eq!(filtered, input);
}

#[test]
fn default_config_matches_contract() {
    let config = AgentConfig::default();
    assert_eq!(config.program, "claude");
    assert_eq!(config.queue_capacity, 64);
    assert_eq!(
        config.env_deny_list,
        vec![
            "CLAUDECODE".to_string(),
            "CLAUDE_SESSION_ID".to_string(),
            "CLAUDE_CODE_ENTRYPOINT".to_string(),
        ]
    );
}

#[cfg(unix)]
mod subprocess {
    use std::fs;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    use agent_stream::{Agent, AgentConfig, AgentError, AgentEvent};

    fn fake_agent_script(body: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("fake-agent.sh");
        let mut file = fs::File::create(&path).expect("create script");
        writeln!(file, "#!/bin/sh\n{body}").expect("write script");
        let mut perms = file.metadata().expect("script metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod script");
        (dir, path.to_string_lossy().into_owned())
    }

    #[test]
    fn spawn_failure_surfaces_before_any_handle_exists() {
        let config = AgentConfig {
            program: "/nonexistent/lodestar-fake-agent".to_string(),
            ..AgentConfig::default()
        };
        let error = Agent::start(&config, "hello").expect_err("spawn should fail");
        assert!(matches!(error, AgentError::Spawn { .. }));
    }

    #[test]
    fn events_flow_until_stream_close_then_stop_returns() {
        let (_dir, program) = fake_agent_script(concat!(
            "echo '{\"type\":\"system\",\"message\":\"booted\"}'\n",
            "echo '{\"type\":\"result\",\"duration_ms\":10,\"cost_usd\":0,\"is_error\":false}'\n",
            "cat >/dev/null\n",
        ));
        let config = AgentConfig {
            program,
            ..AgentConfig::default()
        };

        let agent = Agent::start(&config, "hello").expect("spawn fake agent");
        assert_eq!(
            agent.next_event(),
            Some(AgentEvent::System {
                message: "booted".to_string(),
            })
        );
        assert!(matches!(agent.next_event(), Some(AgentEvent::Result(_))));

        // Closing stdin lets `cat` finish; the stream then closes.
        agent.stop();
        assert!(agent.is_exited());
        assert_eq!(agent.next_event(), None);
    }

    #[test]
    fn send_writes_a_line_to_the_child_input() {
        // The fake agent echoes its first stdin line back as a system event.
        let (_dir, program) = fake_agent_script(concat!(
            "read line\n",
            "echo \"{\\\"type\\\":\\\"system\\\",\\\"message\\\":\\\"$line\\\"}\"\n",
        ));
        let config = AgentConfig {
            program,
            ..AgentConfig::default()
        };

        let agent = Agent::start(&config, "hello").expect("spawn fake agent");
        agent.send("ping").expect("send line");
        assert_eq!(
            agent.next_event(),
            Some(AgentEvent::System {
                message: "ping".to_string(),
            })
        );
        agent.wait_exited();
    }
}
