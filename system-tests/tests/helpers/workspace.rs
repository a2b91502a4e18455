// system-tests/tests/helpers/workspace.rs
// ============================================================================
// Module: Stub Client Workspace
// Description: Temporary directory with a stub client module and API document.
// Purpose: Let real runtimes execute documented examples without a server.
// Dependencies: example-gate-core, system-tests, tempfile
// ============================================================================

//! ## Overview
//! The stub `zulip-js` module reads the credentials file the harness
//! materializes, rejects a missing key, and answers each call with a canned
//! success payload. Responses are shaped to match [`OPENAPI_YAML`].

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use example_gate_core::resolve_runtime;
use system_tests::config::SystemTestConfig;
use tempfile::TempDir;

/// Stub client module installed as `node_modules/zulip-js/index.js`.
const STUB_CLIENT_JS: &str = r"'use strict';
const fs = require('fs');

function readCredentials(path) {
    const entries = {};
    for (const line of fs.readFileSync(path, 'utf8').split('\n')) {
        const index = line.indexOf('=');
        if (index > 0) {
            entries[line.slice(0, index).trim()] = line.slice(index + 1).trim();
        }
    }
    return entries;
}

module.exports = function zulip(config) {
    const credentials = readCredentials(config.zuliprc);
    if (!credentials.key || !credentials.email || !credentials.site) {
        return Promise.reject(new Error('incomplete zuliprc'));
    }
    let nextId = 100;
    const client = {
        messages: {
            send: (params) => Promise.resolve({ result: 'success', msg: '', id: nextId++ }),
        },
        users: {
            me: {
                getProfile: () => Promise.resolve({
                    result: 'success',
                    msg: '',
                    email: credentials.email,
                    user_id: 9,
                }),
            },
        },
    };
    return Promise.resolve(client);
};
";

/// API document covering the endpoints the stub answers.
pub const OPENAPI_YAML: &str = r"openapi: 3.0.1
info:
  title: Zulip REST API
  version: 1.0.0
paths:
  /messages:
    post:
      responses:
        200:
          description: Success.
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/SendMessageSuccess'
  /users/me:
    get:
      responses:
        200:
          description: Success.
          content:
            application/json:
              schema:
                type: object
                additionalProperties: false
                required: [result, msg, email, user_id]
                properties:
                  result:
                    type: string
                    enum: [success]
                  msg:
                    type: string
                  email:
                    type: string
                  user_id:
                    type: integer
components:
  schemas:
    SendMessageSuccess:
      type: object
      additionalProperties: false
      required: [result, msg, id]
      properties:
        result:
          type: string
          enum: [success]
        msg:
          type: string
        id:
          type: integer
";

/// Script declaring a second example for the `/users/me` endpoint.
pub const GET_OWN_USER_JS: &str = "const zulip = require('zulip-js');
const config = { zuliprc: 'zuliprc' };

// {code_example|start}
// Get the profile of the user/bot that requests this endpoint
zulip(config).then((client) => client.users.me.getProfile().then(console.log));
// {code_example|end}
";

/// Runtime located for this run.
pub struct Runtime {
    /// Program that answered the probe.
    pub program: PathBuf,
    /// Per-script timeout.
    pub timeout: Duration,
}

/// Probes for a runtime. `Err` carries the skip reason.
///
/// # Panics
///
/// Panics when no runtime is found and the environment requires one.
pub fn probe_runtime() -> Result<Runtime, String> {
    let config = SystemTestConfig::load()?;
    let candidates = config.runtime_candidates();
    let candidates: Vec<&str> = candidates.iter().map(String::as_str).collect();
    match resolve_runtime(&candidates) {
        Ok(check) => Ok(Runtime {
            program: check.path,
            timeout: config.timeout.unwrap_or(Duration::from_secs(30)),
        }),
        Err(err) if config.require_runtime => panic!("runtime required: {err}"),
        Err(err) => Err(err.to_string()),
    }
}

/// Temporary directory holding the stub client and API document.
pub struct StubWorkspace {
    dir: TempDir,
}

impl StubWorkspace {
    /// Creates the workspace.
    pub fn new() -> Result<Self, String> {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let module_dir = dir.path().join("node_modules").join("zulip-js");
        fs::create_dir_all(&module_dir).map_err(|err| err.to_string())?;
        fs::write(module_dir.join("index.js"), STUB_CLIENT_JS).map_err(|err| err.to_string())?;
        fs::write(dir.path().join("zulip.yaml"), OPENAPI_YAML).map_err(|err| err.to_string())?;
        fs::write(dir.path().join("get_own_user.js"), GET_OWN_USER_JS)
            .map_err(|err| err.to_string())?;
        Ok(Self {
            dir,
        })
    }

    /// Returns the workspace root; the runtime runs here.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the `node_modules` directory for `NODE_PATH`.
    pub fn node_path(&self) -> PathBuf {
        self.root().join("node_modules")
    }

    /// Returns the API document path.
    pub fn openapi_path(&self) -> PathBuf {
        self.root().join("zulip.yaml")
    }

    /// Returns where the harness writes credentials.
    pub fn credentials_path(&self) -> PathBuf {
        self.root().join("run").join(".zuliprc")
    }

    /// Writes `example-gate.toml` for the CLI and returns its path.
    pub fn write_config(&self, runtime: &Runtime, api_key_env: &str) -> Result<PathBuf, String> {
        let config = format!(
            "[runtime]\nprogram = '{program}'\nworking_dir = '.'\ntimeout_ms = {timeout}\n\
             env = {{ NODE_PATH = '{node_path}' }}\n\n\
             [credentials]\npath = 'run/.zuliprc'\nemail = 'iago@zulip.com'\n\
             base_url = 'http://localhost:9991/api/'\napi_key_env = '{api_key_env}'\n\n\
             [openapi]\npath = 'zulip.yaml'\n\n\
             [[examples]]\nname = 'get_own_user'\nendpoint = '/users/me:get'\n\
             script = 'get_own_user.js'\n",
            program = runtime.program.display(),
            timeout = runtime.timeout.as_millis(),
            node_path = self.node_path().display(),
        );
        let path = self.root().join("example-gate.toml");
        fs::write(&path, config).map_err(|err| err.to_string())?;
        Ok(path)
    }
}
