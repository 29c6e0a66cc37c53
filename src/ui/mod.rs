use crate::core::config::Config;
use crate::core::form::{InfoPanel, VoiceForm, FILE_INFO, MAX_ACTOR_COUNT};
use crate::core::state::SubmissionState;
use crate::services::client::{resolve_url, HttpAudioClient};
use crate::services::demo::{demo_script_display, load_demo_script, DEFAULT_DEMO_SCRIPT};
use crate::services::request::UploadFile;
use crate::services::submission::{SubmissionController, SubmitError};
use leptos::*;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

mod playback;
pub use playback::ObjectUrlPlayback;

type Controller = SubmissionController<HttpAudioClient, ObjectUrlPlayback>;

fn page_config() -> Config {
    Config {
        demo_script: Some(DEFAULT_DEMO_SCRIPT.to_string()),
        ..Config::default()
    }
}

fn page_url() -> Option<url::Url> {
    window()
        .location()
        .href()
        .ok()
        .and_then(|href| url::Url::parse(&href).ok())
}

fn alert(message: &str) {
    if let Err(e) = window().alert_with_message(message) {
        log::warn!("alert failed: {:?}", e);
    }
}

async fn read_selected_file(
    input: &web_sys::HtmlInputElement,
) -> Result<Option<UploadFile>, JsValue> {
    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return Ok(None);
    };
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(Some(UploadFile::new(file.name(), bytes).with_mime(file.type_())))
}

#[component]
pub fn App() -> impl IntoView {
    let config = page_config();
    match HttpAudioClient::new(&config) {
        Ok(client) => view! { <VoiceFormPage config=config client=client/> }.into_view(),
        Err(e) => view! { <p>"Invalid configuration: " {e.to_string()}</p> }.into_view(),
    }
}

#[component]
fn VoiceFormPage(config: Config, client: HttpAudioClient) -> impl IntoView {
    let demo_http = client.http().clone();
    let controller: Rc<Controller> =
        Rc::new(SubmissionController::new(client, ObjectUrlPlayback));

    let form = create_rw_signal(VoiceForm::new());
    let panel = create_rw_signal(InfoPanel::default());
    let status = create_rw_signal(SubmissionState::Idle);
    let output_visible = create_rw_signal(false);
    let demo_text = create_rw_signal(None::<String>);

    let file_ref = create_node_ref::<html::Input>();
    let audio_ref = create_node_ref::<html::Audio>();

    if let Some(raw) = config.demo_script.clone() {
        spawn_local(async move {
            let result = match resolve_url(page_url().as_ref(), &raw) {
                Ok(url) => load_demo_script(&demo_http, url).await,
                Err(e) => Err(e),
            };
            demo_text.set(Some(demo_script_display(result)));
        });
    }

    let on_count_change = move |ev: ev::Event| {
        form.update(|f| f.update_voice_inputs(&event_target_value(&ev)));
    };

    let on_generate = move |_: ev::MouseEvent| {
        let controller = controller.clone();
        let Some(input) = file_ref.get_untracked() else {
            return;
        };
        spawn_local(async move {
            let file = match read_selected_file(&input).await {
                Ok(file) => file,
                Err(e) => {
                    let err = SubmitError::FileRead(anyhow::anyhow!("{:?}", e));
                    err.report();
                    alert(err.user_message());
                    return;
                }
            };

            let snapshot = form.get_untracked();
            let submission = match controller.begin(&snapshot, file) {
                Ok(submission) => submission,
                Err(e) => {
                    alert(e.user_message());
                    return;
                }
            };
            status.set(controller.state());

            let result = submission.run().await;
            status.set(controller.state());

            match result {
                Ok(outcome) => {
                    output_visible.set(true);
                    if let Some(audio) = audio_ref.get_untracked() {
                        audio.set_src(&outcome.handle);
                        audio.load();
                        // Autoplay refusal rejects the promise rather than throwing.
                        let played = match audio.play() {
                            Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
                            Err(e) => Err(e),
                        };
                        if let Err(e) = played {
                            log::warn!("Autoplay rejected: {:?}", e);
                        }
                    }
                }
                Err(e) => alert(e.user_message()),
            }
        });
    };

    view! {
        <div class="app-container">
            <h1>"Multitalk"</h1>

            <button type="button" id="toggleInfo" on:click=move |_| panel.update(InfoPanel::toggle)>
                {move || panel.with(|p| p.label())}
            </button>
            <div
                id="fileInfo"
                style:display=move || if panel.with(|p| p.is_shown()) { "block" } else { "none" }
            >
                <pre>{FILE_INFO}</pre>
            </div>

            <form id="audioForm" on:submit=|ev: ev::SubmitEvent| ev.prevent_default()>
                <label for="textFile">"Script file:"</label>
                <input type="file" id="textFile" accept=".txt,text/plain" node_ref=file_ref/>

                <label for="numActors">"Number of actors:"</label>
                <input
                    type="number"
                    id="numActors"
                    min="1"
                    max=MAX_ACTOR_COUNT.to_string()
                    value="1"
                    on:change=on_count_change
                />

                <div id="voiceInputs">
                    {move || {
                        form.with(|f| f.fields().to_vec())
                            .into_iter()
                            .map(|field| {
                                let index = field.index;
                                view! {
                                    <div class="actor-description">
                                        <label>{field.label}</label>
                                        <input
                                            type="text"
                                            name=field.name
                                            placeholder=field.placeholder
                                            prop:value=field.value
                                            on:input=move |ev| {
                                                let value = event_target_value(&ev);
                                                form.update_untracked(|f| {
                                                    if let Err(e) = f.set_description(index, value) {
                                                        log::warn!("{:#}", e);
                                                    }
                                                });
                                            }
                                        />
                                    </div>
                                }
                            })
                            .collect_view()
                    }}
                </div>

                <button
                    type="button"
                    id="submit-button"
                    prop:disabled=move || status.get().is_busy()
                    on:click=on_generate
                >
                    {move || status.get().button_label()}
                </button>
            </form>

            <div id="output" style:display=move || if output_visible.get() { "block" } else { "none" }>
                <audio id="audioPlayer" controls=true node_ref=audio_ref></audio>
            </div>

            <pre id="scriptDisplay">{move || demo_text.get()}</pre>
        </div>
    }
}
