pub mod catalog;
pub mod combination;
pub mod gesture;
pub mod session;
pub mod settings;
pub mod shuffle;

use catalog::{Area, Catalog, Difficulty, Stance};
use combination::TrickCombination;
use gesture::{DragSession, GestureConfig, Rect, Release, VelocityTracker};
use rand::rngs::StdRng;
use rand::SeedableRng;
use session::{Session, SessionState, Vote};
use settings::{LocalSettingsStore, SettingsError, UserSettings};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::wasm_bindgen;
use web_sys::{window, Element, HtmlInputElement};
use yew::prelude::*;

const TINT_DISTANCE: f64 = 80.0;
const VISIBLE_CARDS: usize = 2;

struct DragState {
    pointer_id: i32,
    start_x: f64,
    offset: f64,
    gesture: DragSession,
    velocity: VelocityTracker,
}

type DragHandle = Rc<RefCell<Option<DragState>>>;

#[derive(Clone, PartialEq)]
struct Departing {
    key: usize,
    combination: TrickCombination,
    offset: f64,
}

struct Trainer {
    catalog: Rc<Catalog>,
    session: Session,
}

enum TrainerAction {
    Vote(Vote),
    Restart,
    SettingsChanged(UserSettings),
}

impl Reducible for Trainer {
    type Action = TrainerAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut session = self.session.clone();
        match action {
            TrainerAction::Vote(vote) => {
                if session.vote(vote).is_none() {
                    return self;
                }
            }
            TrainerAction::Restart => session.restart(),
            TrainerAction::SettingsChanged(settings) => {
                session.settings_changed(&self.catalog, settings)
            }
        }

        Rc::new(Self {
            catalog: self.catalog.clone(),
            session,
        })
    }
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub catalog: Rc<Catalog>,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let trainer = {
        let catalog = props.catalog.clone();
        use_reducer(move || {
            let session = Session::new(&catalog, LocalSettingsStore, StdRng::from_entropy());
            Trainer { catalog, session }
        })
    };
    let drag = use_mut_ref(|| None::<DragState>);
    let drag_offset = use_state(|| None::<f64>);
    let departing = use_state(|| None::<Departing>);
    let settings_open = use_state(|| false);
    let card_ref = use_node_ref();
    let config = GestureConfig::default();

    let on_vote = {
        let trainer = trainer.clone();
        let drag = drag.clone();
        let drag_offset = drag_offset.clone();
        Callback::from(move |vote: Vote| {
            drag.borrow_mut().take();
            drag_offset.set(None);
            trainer.dispatch(TrainerAction::Vote(vote));
        })
    };

    let on_restart = {
        let trainer = trainer.clone();
        let departing = departing.clone();
        Callback::from(move |_: web_sys::MouseEvent| {
            departing.set(None);
            trainer.dispatch(TrainerAction::Restart);
        })
    };

    let on_save_settings = {
        let trainer = trainer.clone();
        let departing = departing.clone();
        Callback::from(move |settings: UserSettings| {
            departing.set(None);
            trainer.dispatch(TrainerAction::SettingsChanged(settings));
        })
    };

    let open_settings = {
        let settings_open = settings_open.clone();
        Callback::from(move |_: web_sys::MouseEvent| settings_open.set(true))
    };

    let close_settings = {
        let settings_open = settings_open.clone();
        Callback::from(move |_: ()| settings_open.set(false))
    };

    let pointer_down = {
        let drag = drag.clone();
        let drag_offset = drag_offset.clone();
        let card_ref = card_ref.clone();
        Callback::from(move |event: web_sys::PointerEvent| {
            event.prevent_default();
            if drag.borrow().is_some() {
                return;
            }
            let card = card_ref.cast::<Element>();
            if let Some(card) = &card {
                let _ = card.set_pointer_capture(event.pointer_id());
            }

            let mut velocity = VelocityTracker::new();
            velocity.push(0.0, event.time_stamp());
            *drag.borrow_mut() = Some(DragState {
                pointer_id: event.pointer_id(),
                start_x: event.client_x() as f64,
                offset: 0.0,
                gesture: DragSession::start(),
                velocity,
            });
            drag_offset.set(Some(0.0));
        })
    };

    let pointer_move = {
        let drag = drag.clone();
        let drag_offset = drag_offset.clone();
        let card_ref = card_ref.clone();
        let trainer = trainer.clone();
        Callback::from(move |event: web_sys::PointerEvent| {
            let (offset, vote) = {
                let mut guard = drag.borrow_mut();
                let Some(state) = guard.as_mut() else {
                    return;
                };
                if state.pointer_id != event.pointer_id() {
                    return;
                }
                event.prevent_default();

                let offset = config.offset(event.client_x() as f64 - state.start_x);
                state.offset = offset;
                state.velocity.push(offset, event.time_stamp());
                let card = card_ref.cast::<Element>().map(|card| measure(&card));
                (offset, state.gesture.sample(card, container_rect(&card_ref)))
            };

            match vote {
                Some(vote) => {
                    release_capture(&card_ref, event.pointer_id());
                    drag.borrow_mut().take();
                    drag_offset.set(None);
                    trainer.dispatch(TrainerAction::Vote(vote));
                }
                None => drag_offset.set(Some(offset)),
            }
        })
    };

    let pointer_up = {
        let drag = drag.clone();
        let drag_offset = drag_offset.clone();
        let departing = departing.clone();
        let card_ref = card_ref.clone();
        let trainer = trainer.clone();
        Callback::from(move |event: web_sys::PointerEvent| {
            let Some(mut state) = take_drag(&drag, event.pointer_id()) else {
                return;
            };
            release_capture(&card_ref, state.pointer_id);
            drag_offset.set(None);

            let release = state.gesture.release(
                state.velocity.velocity(),
                card_ref.cast::<Element>().map(|card| measure(&card)),
                container_rect(&card_ref),
                &config,
            );

            if let Release::FlyAway {
                direction,
                distance,
            } = release
            {
                if let Some(combination) = trainer.session.current() {
                    departing.set(Some(Departing {
                        key: voted_count(&trainer.session),
                        combination: combination.clone(),
                        offset: distance,
                    }));
                }
                if let Some(vote) = state.gesture.throw(direction) {
                    trainer.dispatch(TrainerAction::Vote(vote));
                }
            }
        })
    };

    let pointer_cancel = {
        let drag = drag.clone();
        let drag_offset = drag_offset.clone();
        let card_ref = card_ref.clone();
        Callback::from(move |event: web_sys::PointerEvent| {
            if take_drag(&drag, event.pointer_id()).is_some() {
                release_capture(&card_ref, event.pointer_id());
                drag_offset.set(None);
            }
        })
    };

    let departed = {
        let departing = departing.clone();
        Callback::from(move |_: web_sys::TransitionEvent| departing.set(None))
    };

    {
        use_effect_with_deps(
            move |offset: &Option<f64>| {
                apply_body_tint(offset.and_then(body_background_for_offset));
                || apply_body_tint(None)
            },
            *drag_offset,
        );
    }

    let session = &trainer.session;
    let handlers = CardHandlers {
        on_vote,
        pointer_down,
        pointer_move,
        pointer_up,
        pointer_cancel,
        departed,
    };

    html! {
        <div class="app-container">
            <header class="app-header">
                <div class="title-row">
                    <h1>{ "Tricks" }</h1>
                    <button class="settings-button" aria-label="open-user-settings"
                        onclick={open_settings}>{ "⚙" }</button>
                </div>
                <h2 class="subtitle">{ "Your personal skateboarding trainer" }</h2>
            </header>
            <main class={classes!("content", "single-column", if *settings_open { Some("inert") } else { None })}>
                { render_card_stack(session, &departing, *drag_offset, &card_ref, &handlers) }
                {
                    if session.state() == SessionState::Completed {
                        render_results(session, on_restart)
                    } else {
                        html! {}
                    }
                }
            </main>
            <SettingsPanel
                open={*settings_open}
                settings={session.settings().clone()}
                on_save={on_save_settings}
                on_close={close_settings} />
        </div>
    }
}

struct CardHandlers {
    on_vote: Callback<Vote>,
    pointer_down: Callback<web_sys::PointerEvent>,
    pointer_move: Callback<web_sys::PointerEvent>,
    pointer_up: Callback<web_sys::PointerEvent>,
    pointer_cancel: Callback<web_sys::PointerEvent>,
    departed: Callback<web_sys::TransitionEvent>,
}

fn render_card_stack(
    session: &Session,
    departing: &UseStateHandle<Option<Departing>>,
    drag_offset: Option<f64>,
    card_ref: &NodeRef,
    handlers: &CardHandlers,
) -> Html {
    let voted = voted_count(session);
    let cards: Vec<(usize, &TrickCombination)> = session
        .upcoming(VISIBLE_CARDS)
        .enumerate()
        .map(|(index, combination)| (voted + index, combination))
        .collect();

    let mut stack: Vec<Html> = cards
        .into_iter()
        .rev()
        .map(|(key, combination)| {
            if key != voted {
                return html! {
                    <div key={key.to_string()} class="swipe-card behind">
                        { render_trick_card(combination, &Callback::noop()) }
                    </div>
                };
            }

            let offset = drag_offset.unwrap_or(0.0);
            let transition = if drag_offset.is_some() {
                "transform 0s"
            } else {
                "transform 0.25s ease"
            };
            html! {
                <div key={key.to_string()}
                    ref={card_ref.clone()}
                    class={classes!("swipe-card", "top", drag_offset.map(|_| "dragging"))}
                    style={card_transform(offset, transition)}
                    onpointerdown={handlers.pointer_down.clone()}
                    onpointermove={handlers.pointer_move.clone()}
                    onpointerup={handlers.pointer_up.clone()}
                    onpointercancel={handlers.pointer_cancel.clone()}>
                    { render_trick_card(combination, &handlers.on_vote) }
                </div>
            }
        })
        .collect();

    // same key as the card it replaces, so the element is reused and the
    // transform transitions from where the pointer let go
    if let Some(card) = &**departing {
        stack.push(html! {
            <div key={card.key.to_string()}
                class="swipe-card departing"
                style={card_transform(card.offset, "transform 0.35s ease-out")}
                ontransitionend={handlers.departed.clone()}>
                { render_trick_card(&card.combination, &Callback::noop()) }
            </div>
        });
    }

    html! {
        <div class="card-stack">
            { for stack }
        </div>
    }
}

fn render_trick_card(combination: &TrickCombination, on_vote: &Callback<Vote>) -> Html {
    let areas = combination
        .areas
        .iter()
        .map(|area| area.label())
        .collect::<Vec<_>>()
        .join(" • ");

    let keep_pointer = Callback::from(|event: web_sys::PointerEvent| event.stop_propagation());
    let skip = {
        let on_vote = on_vote.clone();
        Callback::from(move |_: web_sys::MouseEvent| on_vote.emit(Vote::Reject))
    };
    let landed = {
        let on_vote = on_vote.clone();
        Callback::from(move |_: web_sys::MouseEvent| on_vote.emit(Vote::Accept))
    };

    let media = match &combination.demo {
        Some(demo) => html! {
            <div class="trick-video">
                <iframe allowfullscreen=true
                    title={demo.title.clone()}
                    src={format!("{}?mute=1", demo.url)} />
            </div>
        },
        None => html! {
            <div class="trick-video placeholder">
                <p>{ "No video available" }</p>
            </div>
        },
    };

    html! {
        <div class="trick-card">
            { media }
            <div class="trick-body">
                <p class="trick-meta">
                    { format!(
                        "{areas}  •  {}  •  {}",
                        combination.difficulty.label(),
                        combination.category.label()
                    ) }
                </p>
                <p class="card-title">{ &combination.name }</p>
                <div class="trick-actions">
                    <button class="vote-button skip" aria-label="Skipping"
                        onpointerdown={keep_pointer.clone()} onclick={skip}>{ "✕" }</button>
                    <button class="vote-button landed" aria-label="Landed"
                        onpointerdown={keep_pointer} onclick={landed}>{ "✓" }</button>
                </div>
            </div>
        </div>
    }
}

fn render_results(session: &Session, on_restart: Callback<web_sys::MouseEvent>) -> Html {
    if session.total() == 0 {
        return html! {
            <div class="results">
                <p class="empty-hint">
                    { "No tricks match your settings. Open the settings to pick another level or area." }
                </p>
            </div>
        };
    }

    html! {
        <div class="results">
            <ul class="result-list">
                { for session.completed().iter().map(|trick| html! {
                    <li class="completed">
                        <span class="result-icon">{ "✓" }</span>
                        { &trick.name }
                    </li>
                }) }
                { for session.cancelled().iter().map(|trick| html! {
                    <li class="cancelled">
                        <span class="result-icon">{ "↻" }</span>
                        { &trick.name }
                    </li>
                }) }
            </ul>
            <button class="restart-button" onclick={on_restart}>{ "Restart" }</button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct SettingsPanelProps {
    open: bool,
    settings: UserSettings,
    on_save: Callback<UserSettings>,
    on_close: Callback<()>,
}

#[function_component(SettingsPanel)]
fn settings_panel(props: &SettingsPanelProps) -> Html {
    let draft = use_state(|| props.settings.clone());
    let error = use_state(|| None::<SettingsError>);

    {
        let draft = draft.clone();
        let error = error.clone();
        use_effect_with_deps(
            move |(_, settings): &(bool, UserSettings)| {
                draft.set(settings.clone());
                error.set(None);
                || ()
            },
            (props.open, props.settings.clone()),
        );
    }

    let on_level = {
        let draft = draft.clone();
        Callback::from(move |event: web_sys::InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let Some(level) = input.value().parse::<u8>().ok().and_then(Difficulty::from_rank) else {
                return;
            };
            let mut next = (*draft).clone();
            next.level = level;
            draft.set(next);
        })
    };

    let on_include_easier = {
        let draft = draft.clone();
        Callback::from(move |_: web_sys::Event| {
            let mut next = (*draft).clone();
            next.include_easier_tricks = !next.include_easier_tricks;
            draft.set(next);
        })
    };

    let stance_buttons = Stance::ALL.into_iter().map(|stance| {
        let draft = draft.clone();
        let active = draft.stances.contains(&stance);
        let onclick = Callback::from(move |_: web_sys::MouseEvent| {
            let mut next = (*draft).clone();
            next.toggle_stance(stance);
            draft.set(next);
        });
        html! {
            <button class={classes!("toggle", active.then_some("active"))} onclick={onclick}>
                { stance.label() }
            </button>
        }
    });

    let area_buttons = Area::ALL.into_iter().map(|area| {
        let draft = draft.clone();
        let active = draft.areas.contains(&area);
        let onclick = Callback::from(move |_: web_sys::MouseEvent| {
            let mut next = (*draft).clone();
            next.toggle_area(area);
            draft.set(next);
        });
        html! {
            <button class={classes!("toggle", active.then_some("active"))} onclick={onclick}>
                { area.label() }
            </button>
        }
    });

    let on_cancel = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: web_sys::MouseEvent| on_close.emit(()))
    };

    let on_save = {
        let draft = draft.clone();
        let error = error.clone();
        let on_save = props.on_save.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |_: web_sys::MouseEvent| match draft.validate() {
            Ok(()) => {
                on_save.emit((*draft).clone());
                on_close.emit(());
            }
            Err(err) => error.set(Some(err)),
        })
    };

    let overlay_classes = classes!("settings-overlay", props.open.then_some("open"));
    let panel_classes = classes!("settings-panel", props.open.then_some("open"));
    let stop_click = Callback::from(|event: web_sys::MouseEvent| event.stop_propagation());

    html! {
        <div class={overlay_classes} onclick={on_cancel.clone()}>
            <aside class={panel_classes} onclick={stop_click}>
                <h2>{ "User Settings" }</h2>

                <section class="settings-section">
                    <label for="level">{ "Level" }</label>
                    <input id="level" type="range" min="0" max="3" step="1"
                        aria-label="Difficulty Level"
                        value={draft.level.rank().to_string()}
                        oninput={on_level} />
                    <span class="level-label">{ draft.level.label() }</span>
                    <label class="checkbox">
                        <input type="checkbox"
                            checked={draft.include_easier_tricks}
                            onchange={on_include_easier} />
                        { "Include easier tricks" }
                    </label>
                </section>

                <section class="settings-section">
                    <h3>{ "Stances" }</h3>
                    <div class="button-group">{ for stance_buttons }</div>
                </section>

                <section class="settings-section">
                    <h3>{ "Area" }</h3>
                    <div class="button-group">{ for area_buttons }</div>
                </section>

                {
                    match &*error {
                        Some(err) => html! { <p class="settings-error">{ err.to_string() }</p> },
                        None => html! {},
                    }
                }

                <footer class="settings-actions">
                    <button class="cancel" onclick={on_cancel}>{ "Cancel" }</button>
                    <button class="save" onclick={on_save}>{ "Save" }</button>
                </footer>
            </aside>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct LoadErrorProps {
    pub message: String,
}

#[function_component(LoadError)]
pub fn load_error(props: &LoadErrorProps) -> Html {
    html! {
        <div class="app-container">
            <p class="error">{ format!("The trick list could not be loaded: {}", props.message) }</p>
        </div>
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    match Catalog::embedded() {
        Ok(catalog) => {
            log::info!("Loaded {} tricks", catalog.trick_count());
            yew::Renderer::<App>::with_props(AppProps {
                catalog: Rc::new(catalog),
            })
            .render();
        }
        Err(err) => {
            log::error!("Trick catalog is invalid: {}", err);
            yew::Renderer::<LoadError>::with_props(LoadErrorProps {
                message: err.to_string(),
            })
            .render();
        }
    }
}

fn voted_count(session: &Session) -> usize {
    session.completed().len() + session.cancelled().len()
}

fn take_drag(drag: &DragHandle, pointer_id: i32) -> Option<DragState> {
    let mut guard = drag.borrow_mut();
    let owned = guard
        .as_ref()
        .map_or(false, |state| state.pointer_id == pointer_id);
    if owned {
        guard.take()
    } else {
        None
    }
}

fn measure(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.left(), rect.width())
}

fn container_rect(card_ref: &NodeRef) -> Option<Rect> {
    card_ref
        .cast::<Element>()
        .and_then(|card| card.parent_element())
        .map(|container| measure(&container))
}

fn release_capture(card_ref: &NodeRef, pointer_id: i32) {
    if let Some(card) = card_ref.cast::<Element>() {
        let _ = card.release_pointer_capture(pointer_id);
    }
}

fn card_transform(offset: f64, transition: &str) -> String {
    format!(
        "transform: translateX({:.1}px) rotate({:.2}deg); transition: {};",
        offset,
        offset * 0.05,
        transition
    )
}

fn apply_body_tint(background: Option<String>) {
    let Some(body) = window()
        .and_then(|window| window.document())
        .and_then(|document| document.body())
    else {
        return;
    };

    let style = body.style();
    let _ = style.set_property("transition", "background 0.25s ease");
    match background {
        Some(gradient) => {
            let _ = style.set_property("background", &gradient);
            let _ = style.set_property("background-image", &gradient);
        }
        None => {
            let _ = style.remove_property("background");
            let _ = style.remove_property("background-image");
        }
    }
}

/// Green towards the accept side, red towards the reject side.
fn body_background_for_offset(offset: f64) -> Option<String> {
    let normalized = (offset / TINT_DISTANCE).clamp(-1.0, 1.0);
    if normalized.abs() < 0.01 {
        return None;
    }

    let strength = normalized.abs();
    let start_alpha = 0.18 * strength;
    let end_alpha = 0.38 * strength + 0.02;
    if normalized > 0.0 {
        Some(format!(
            "radial-gradient(circle at top, rgba(46, 204, 113, {:.3}), rgba(8, 64, 32, {:.3}))",
            start_alpha, end_alpha
        ))
    } else {
        Some(format!(
            "radial-gradient(circle at top, rgba(255, 62, 62, {:.3}), rgba(112, 8, 18, {:.3}))",
            start_alpha, end_alpha
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tint_follows_drag_side() {
        assert_eq!(body_background_for_offset(0.0), None);
        assert!(body_background_for_offset(40.0)
            .unwrap()
            .contains("46, 204, 113"));
        assert!(body_background_for_offset(-40.0)
            .unwrap()
            .contains("255, 62, 62"));
    }

    #[test]
    fn card_transform_rotates_with_offset() {
        assert_eq!(
            card_transform(100.0, "transform 0s"),
            "transform: translateX(100.0px) rotate(5.00deg); transition: transform 0s;"
        );
    }
}
