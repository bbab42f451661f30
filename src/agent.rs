//! The conversation relay loop between the user, the capabilities, and the
//! remote model.

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::devices::device_csv_body;
use crate::gemini::{GeminiClient, ResponsePart, ToolDef};
use crate::tools::{CapabilityDispatch, CapabilityResult};
use crate::transcript::{Entry, Transcript};

pub struct Agent {
    client: GeminiClient,
    tools: Box<dyn CapabilityDispatch>,
    tool_defs: Vec<ToolDef>,
    system_prompt: String,
    transcript: Transcript,
}

impl Agent {
    pub fn new(
        client: GeminiClient,
        tools: Box<dyn CapabilityDispatch>,
        system_prompt: String,
    ) -> Self {
        let tool_defs = tools.tool_defs();
        Self {
            client,
            tools,
            tool_defs,
            system_prompt,
            transcript: Transcript::new(),
        }
    }

    /// Run one user turn: append the user line, relay the transcript to the
    /// model until a round produces no capability invocation, and return
    /// everything appended during the turn (the user line included).
    ///
    /// Model errors and capture connect errors propagate; there is no
    /// recovery path here.
    pub async fn run_turn(&mut self, user_text: &str) -> Result<Vec<Entry>> {
        let turn_start = self.transcript.len();
        self.transcript.push_user(user_text);

        loop {
            let parts = self
                .client
                .generate(&self.system_prompt, &self.transcript, &self.tool_defs)
                .await?;

            let mut invoked = false;
            for part in parts {
                match part {
                    ResponsePart::Text(text) => self.transcript.push_system(&text),
                    ResponsePart::FunctionCall { name, args } => {
                        invoked = true;
                        self.handle_function_call(&name, &args).await?;
                    }
                }
            }

            // The model gets one more round to react whenever it asked for a
            // capability, even one we don't have.
            if !invoked {
                break;
            }
        }

        Ok(self.transcript.entries()[turn_start..].to_vec())
    }

    async fn handle_function_call(&mut self, name: &str, args: &Value) -> Result<()> {
        let Some(result) = self.tools.invoke(name, args).await? else {
            debug!("skipping unregistered capability {name}");
            return Ok(());
        };

        let cam_id = args["cam_id"].as_str().unwrap_or("?");
        match result {
            CapabilityResult::Absent => {}
            CapabilityResult::Text(text) => {
                self.push_snapshot_notice(cam_id);
                self.transcript.push_system(&text);
            }
            CapabilityResult::Image(jpeg) => {
                self.push_snapshot_notice(cam_id);
                self.transcript.push_image(jpeg);
            }
        }
        Ok(())
    }

    fn push_snapshot_notice(&mut self, cam_id: &str) {
        self.transcript.push_system(&format!(
            "Requested snapshot from the camera {cam_id}. Here is the snapshot:"
        ));
    }
}

/// Assemble the system prompt: persona, the CSV device table, then the
/// free-text home context.
pub fn build_system_prompt(config: &Config) -> String {
    format!(
        "{}\n\n\
        Here are the cameras in your home:\n\
        ```csv\n\
        id,name,location,info\n\
        {}\n\
        ```\n\n\
        Here is some extra info about the home, and the people living in it:\n\
        {}",
        config.system_prompt,
        device_csv_body(&config.devices),
        config.home_info,
    )
    .trim()
    .to_string()
}
