#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::Result;
    use indicatif::{ProgressBar, ProgressStyle};
    use inquire::{Confirm, Text};
    use multitalk::core::config::{Config, CONFIG_FILE};
    use multitalk::core::form::{VoiceForm, DEFAULT_ACTOR_COUNT, FILE_INFO};
    use multitalk::core::script::ScriptSummary;
    use multitalk::services::client::{resolve_url, HttpAudioClient};
    use multitalk::services::demo::{demo_script_display, load_demo_script};
    use multitalk::services::playback::FilePlayback;
    use multitalk::services::request::UploadFile;
    use multitalk::services::submission::SubmissionController;
    use std::path::Path;
    use std::time::Duration;

    type Controller = SubmissionController<HttpAudioClient, FilePlayback>;

    pub async fn run() -> Result<()> {
        // 1. Config
        let config = match Config::load(CONFIG_FILE) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error loading config: {:#}", e);
                return Err(e);
            }
        };
        config.validate()?;
        config.ensure_directories()?;

        let client = HttpAudioClient::new(&config)?;
        println!("Generation endpoint: {}", client.endpoint());

        // 2. Demo script
        if let Some(raw) = &config.demo_script {
            let result = match resolve_url(None, raw) {
                Ok(url) => load_demo_script(client.http(), url).await,
                Err(e) => Err(e),
            };
            println!("--- Demo script ---\n{}\n-------------------", demo_script_display(result));
        }

        let controller = SubmissionController::new(
            client,
            FilePlayback::new(&config.output_folder, &config.output_stem),
        );

        // 3. Form
        let mut file = prompt_file()?;
        let mut form = prompt_form(file.as_ref())?;

        // 4. Generate until the user is done
        loop {
            submit_once(&controller, &form, file.clone()).await;

            let question = format!("{}?", controller.state().button_label());
            if !Confirm::new(&question).with_default(false).prompt()? {
                break;
            }
            if file.is_none() {
                file = prompt_file()?;
                form = prompt_form(file.as_ref())?;
            }
        }

        if let Some(path) = controller.detach_playback() {
            println!("Audio saved to {}", path.display());
        }
        Ok(())
    }

    fn prompt_file() -> Result<Option<UploadFile>> {
        let raw = Text::new("Script file (.txt):")
            .with_help_message(FILE_INFO)
            .prompt()?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let path = Path::new(raw);
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Cannot read {}: {}", path.display(), e);
                eprintln!("Could not read {}: {}", path.display(), e);
                return Ok(None);
            }
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| raw.to_string());
        Ok(Some(UploadFile::new(name, bytes).with_mime("text/plain")))
    }

    fn prompt_form(file: Option<&UploadFile>) -> Result<VoiceForm> {
        let summary = file.map(|f| ScriptSummary::inspect(&String::from_utf8_lossy(&f.bytes)));
        if let Some(summary) = &summary {
            report_summary(summary);
        }

        let suggested = summary
            .as_ref()
            .map(ScriptSummary::suggested_actor_count)
            .unwrap_or(DEFAULT_ACTOR_COUNT)
            .to_string();
        let raw_count = Text::new("Number of actors:")
            .with_default(&suggested)
            .prompt()?;

        let mut form = VoiceForm::new();
        form.update_voice_inputs(&raw_count);

        if let Some(summary) = &summary {
            if !summary.speakers.is_empty() && summary.speakers.len() != form.actor_count() {
                println!(
                    "Note: the script tags {} speaker(s) but {} actor(s) were requested.",
                    summary.speakers.len(),
                    form.actor_count()
                );
            }
        }

        for field in form.fields().to_vec() {
            let tag = summary
                .as_ref()
                .and_then(|s| s.speakers.get(field.index - 1))
                .map(|tag| format!("Voice for [{}]", tag));
            let mut prompt = Text::new(&field.label).with_placeholder(&field.placeholder);
            if let Some(help) = &tag {
                prompt = prompt.with_help_message(help);
            }
            let description = prompt.prompt()?;
            form.set_description(field.index, description)?;
        }
        Ok(form)
    }

    fn report_summary(summary: &ScriptSummary) {
        if !summary.has_text {
            println!("Warning: the script has no spoken text; the server will reject it.");
        }
        if let Some(scene) = &summary.scene {
            println!("Scene: {}", scene.replace('\n', " "));
        }
        if !summary.speakers.is_empty() {
            println!(
                "Found {} turn(s) by {}",
                summary.turns,
                summary.speakers.join(", ")
            );
        }
    }

    async fn submit_once(controller: &Controller, form: &VoiceForm, file: Option<UploadFile>) {
        let submission = match controller.begin(form, file) {
            Ok(submission) => submission,
            Err(e) => {
                eprintln!("{}", e.user_message());
                return;
            }
        };

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(controller.state().button_label());
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = submission.run().await;
        spinner.finish_and_clear();

        match result {
            Ok(outcome) => {
                let length = outcome
                    .info
                    .duration
                    .map(|d| format!("{:.1}s", d.as_secs_f64()))
                    .unwrap_or_else(|| "unknown length".to_string());
                println!("Audio ready: {} ({})", outcome.handle.display(), length);
            }
            Err(e) => eprintln!("{}", e.user_message()),
        }
    }
}
