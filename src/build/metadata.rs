use crate::build::config::ModRecord;

/// File name of the build-info note placed into the mod resources.
pub const BUILD_INFO_FILE: &str = "mcp-jenkins-buildinfo.txt";

/**
CI build facts read from the Jenkins environment.

Resolved once per run via [`BuildMetadata::from_env`] and passed around by
value, nothing else in the crate consults the environment for these.
Every field is optional, developer machines usually have none of them.
*/
#[derive(Debug, Clone, Default)]
pub struct BuildMetadata {
    pub jenkins_url: Option<String>,
    pub job_url: Option<String>,
    pub build_url: Option<String>,
    pub job_name: Option<String>,
    pub build_id: Option<String>,
    pub build_number: Option<String>,
    pub node_name: Option<String>,
    pub node_labels: Option<String>,
    pub git_commit: Option<String>,
}

impl BuildMetadata {
    pub fn from_env() -> Self {
        Self {
            jenkins_url: env_var("JENKINS_URL"),
            job_url: env_var("JOB_URL"),
            build_url: env_var("BUILD_URL"),
            job_name: env_var("JOB_NAME"),
            build_id: env_var("BUILD_ID"),
            build_number: env_var("BUILD_NUMBER"),
            node_name: env_var("NODE_NAME"),
            node_labels: env_var("NODE_LABELS"),
            git_commit: env_var("GIT_COMMIT"),
        }
    }

    /**
    Renders the build-info note shipped inside the output jars.

    One `Key: value` line per present CI fact, CRLF terminated so the note
    reads cleanly on every platform a jar lands on, closed by a `Generated`
    line with an RFC 3339 timestamp.
    */
    pub fn note(&self) -> String {
        let mut note = String::new();

        push_fact(&mut note, "Jenkins URL", &self.jenkins_url);
        push_fact(&mut note, "Job URL", &self.job_url);
        push_fact(&mut note, "Build URL", &self.build_url);
        push_fact(&mut note, "Job name", &self.job_name);
        push_fact(&mut note, "Build id", &self.build_id);
        push_fact(&mut note, "Build number", &self.build_number);
        push_fact(&mut note, "Node name", &self.node_name);
        push_fact(&mut note, "Node labels", &self.node_labels);

        let generated = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        note.push_str(&format!("Generated: {}\r\n", generated));

        note
    } // note

    /**
    Builds the file name of an output archive for the given role.

    The name is `<prefix><role><suffix>.jar`:
    * prefix `<modid>-` when a matching `mcmod.info` record exists, else
      `<JOB_NAME>-` with `/` folded to `_`, else empty;
    * suffix `-<version>-mc<mcversion>` from the record, then
      `-<first 10 of GIT_COMMIT>`, then `-jnks_<BUILD_NUMBER>`, each part
      only when available.

    `role` is the platform token, `Client` or `Server`.
    */
    pub fn archive_file_name(&self, role: &str, record: Option<&ModRecord>) -> String {
        let mut prefix = String::new();
        let mut suffix = String::new();

        if let Some(record) = record {
            prefix = format!("{}-", record.modid);
            suffix = format!("-{}-mc{}", record.version, record.mcversion);
        } else if let Some(job_name) = &self.job_name {
            prefix = format!("{}-", job_name.replace('/', "_"));
        }

        if let Some(commit) = &self.git_commit {
            let short: String = commit.chars().take(10).collect();
            suffix.push_str(&format!("-{}", short));
        }

        if let Some(number) = &self.build_number {
            suffix.push_str(&format!("-jnks_{}", number));
        }

        format!("{}{}{}.jar", prefix, role, suffix)
    } // archive_file_name
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn push_fact(note: &mut String, label: &str, value: &Option<String>) {
    if let Some(value) = value {
        note.push_str(&format!("{}: {}\r\n", label, value));
    }
}
