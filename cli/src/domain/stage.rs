//! Stage values: ordered remote command lists with fixed status messages.
//!
//! Stages are plain immutable data built by the factory functions below; a
//! single generic runner in `application::services::stage_runner` executes
//! any of them. Every command is written to be safe to repeat on a host that
//! a previous, interrupted run already touched.

use crate::domain::state::OPERATIONAL_ACCOUNT;

/// One unit of remote configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    name: String,
    commands: Vec<String>,
    success_message: String,
    failure_message: String,
}

impl Stage {
    /// Build a stage from its parts.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        commands: Vec<String>,
        success_message: impl Into<String>,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            commands,
            success_message: success_message.into(),
            failure_message: failure_message.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commands in execution order.
    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    #[must_use]
    pub fn success_message(&self) -> &str {
        &self.success_message
    }

    #[must_use]
    pub fn failure_message(&self) -> &str {
        &self.failure_message
    }
}

/// Where the age key pair lives on the host.
pub const AGE_KEY_FILE: &str = "$HOME/.config/sops/age/keys.txt";

/// Marker printed by `age-keygen` in front of the public key.
pub const PUBLIC_KEY_MARKER: &str = "Public key:";

const SOPS_VERSION: &str = "3.9.0";

/// Creates the operating account from the bootstrap session.
#[must_use]
pub fn user_setup_stage() -> Stage {
    let a = OPERATIONAL_ACCOUNT;
    Stage::new(
        format!("Adding user {a}"),
        vec![
            format!("id -u {a} >/dev/null 2>&1 || sudo useradd --create-home --shell /bin/bash {a}"),
            format!("sudo usermod -aG sudo {a}"),
            format!("echo '{a} ALL=(ALL) NOPASSWD:ALL' | sudo tee /etc/sudoers.d/{a} >/dev/null"),
            format!("sudo chmod 0440 /etc/sudoers.d/{a}"),
            format!("sudo mkdir -p /home/{a}/.ssh"),
            format!("sudo cp /root/.ssh/authorized_keys /home/{a}/.ssh/authorized_keys"),
            format!("sudo chown -R {a}:{a} /home/{a}/.ssh"),
            format!("sudo chmod 700 /home/{a}/.ssh && sudo chmod 600 /home/{a}/.ssh/authorized_keys"),
        ],
        format!("Added user {a}"),
        format!("Something went wrong adding user {a} on your VPS"),
    )
}

/// Updates the base system and installs the secrets tooling.
#[must_use]
pub fn base_setup_stage() -> Stage {
    Stage::new(
        "Setting up VPS",
        vec![
            "sudo apt-get update -y".to_string(),
            "sudo DEBIAN_FRONTEND=noninteractive apt-get upgrade -y".to_string(),
            "sudo DEBIAN_FRONTEND=noninteractive apt-get install -y age curl ca-certificates"
                .to_string(),
            format!(
                "command -v sops >/dev/null 2>&1 || (curl -fsSLo /tmp/sops.deb \
                 https://github.com/getsops/sops/releases/download/v{SOPS_VERSION}/sops_{SOPS_VERSION}_$(dpkg --print-architecture).deb \
                 && sudo dpkg -i /tmp/sops.deb)"
            ),
        ],
        "VPS updated and setup successfully",
        "Something went wrong setting up your VPS",
    )
}

/// Command that generates (or re-reads) the age key pair.
///
/// Output always contains `Public key: <key>`; an existing key file is
/// reused so repeated runs extract the same key.
#[must_use]
pub fn keygen_command() -> String {
    format!(
        "mkdir -p $(dirname {AGE_KEY_FILE}) && if [ -f {AGE_KEY_FILE} ]; then \
         echo \"{PUBLIC_KEY_MARKER} $(age-keygen -y {AGE_KEY_FILE})\"; \
         else age-keygen -o {AGE_KEY_FILE} 2>&1; fi"
    )
}

/// Installs Docker and the shared container network.
#[must_use]
pub fn docker_stage() -> Stage {
    let a = OPERATIONAL_ACCOUNT;
    Stage::new(
        "Setting up Docker",
        vec![
            "command -v docker >/dev/null 2>&1 || (curl -fsSL https://get.docker.com -o /tmp/get-docker.sh && sudo sh /tmp/get-docker.sh)".to_string(),
            format!("sudo usermod -aG docker {a}"),
            "sudo systemctl enable --now docker".to_string(),
            format!("sudo docker network inspect {a} >/dev/null 2>&1 || sudo docker network create {a}"),
        ],
        "Docker setup successfully",
        "Something went wrong setting up Docker",
    )
}

const TRAEFIK_DIR: &str = "$HOME/sidekick/traefik";

const TRAEFIK_CONFIG: &str = r#"entryPoints:
  web:
    address: ":80"
    http:
      redirections:
        entryPoint:
          to: websecure
          scheme: https
  websecure:
    address: ":443"

providers:
  docker:
    exposedByDefault: false
    network: sidekick

certificatesResolvers:
  default:
    acme:
      email: "{email}"
      storage: /letsencrypt/acme.json
      httpChallenge:
        entryPoint: web
"#;

const TRAEFIK_COMPOSE: &str = r#"services:
  traefik:
    image: traefik:v3.1
    container_name: traefik
    restart: unless-stopped
    ports:
      - "80:80"
      - "443:443"
    volumes:
      - /var/run/docker.sock:/var/run/docker.sock:ro
      - ./traefik.yml:/etc/traefik/traefik.yml:ro
      - ./letsencrypt:/letsencrypt
    networks:
      - sidekick

networks:
  sidekick:
    external: true
"#;

/// Writes `content` to `path` on the host through a quoted heredoc.
fn write_file_command(path: &str, content: &str) -> String {
    format!("cat > {path} <<'SIDEKICK_EOF'\n{content}SIDEKICK_EOF")
}

/// Sets up Traefik as reverse proxy with Let's Encrypt certificates for `email`.
///
/// `email` must already have passed `validate_cert_email`.
#[must_use]
pub fn traefik_stage(email: &str) -> Stage {
    let config = TRAEFIK_CONFIG.replace("{email}", email);
    Stage::new(
        "Setting up Traefik",
        vec![
            format!("mkdir -p {TRAEFIK_DIR}/letsencrypt"),
            format!(
                "touch {TRAEFIK_DIR}/letsencrypt/acme.json && chmod 600 {TRAEFIK_DIR}/letsencrypt/acme.json"
            ),
            write_file_command(&format!("{TRAEFIK_DIR}/traefik.yml"), &config),
            write_file_command(&format!("{TRAEFIK_DIR}/docker-compose.yml"), TRAEFIK_COMPOSE),
            format!("cd {TRAEFIK_DIR} && sudo docker compose up -d"),
        ],
        "Traefik setup successfully",
        "Something went wrong setting up Traefik",
    )
}
