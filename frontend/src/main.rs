use std::rc::Rc;

use components::{
    error_panel::ErrorPanel,
    map_component::{MapComponent, MapView, ViewTarget},
    workout_form::WorkoutForm,
    workout_list::{FieldEdit, WorkoutList},
};
use gloo_console::{error, info};
use storage::BrowserStorage;
use web_sys::HtmlSelectElement;
use workout_tracker_lib::{
    tracker::SortKey,
    validation::WorkoutForm as FormValues,
    workout::{Workout, WorkoutId},
    Coords, TrackerConfig, TrackerError, WorkoutTracker,
};
use yew::prelude::*;

mod components;
mod geolocation;
mod logging;
mod storage;

const RESET_PROMPT: &str = "Do you want to delete all your workouts?";
const NO_POSITION_ALERT: &str = "Could not get your position";

enum Msg {
    Located(Coords),
    LocationFailed(String),
    MapClicked(Coords),
    Submit(FormValues),
    Edit(FieldEdit),
    Delete(WorkoutId),
    Reset,
    Select(WorkoutId),
    Sort(SortKey),
    ShowAll,
    DismissError,
}

struct App {
    tracker: WorkoutTracker<BrowserStorage>,
    /// Snapshot of the tracker's workouts handed to the map
    workouts: Rc<Vec<Workout>>,
    /// Coordinates of the map click waiting for a form submission
    pending: Option<Coords>,
    error: Option<AttrValue>,
    sort: SortKey,
    view: MapView,
    /// Bumped on every edit so list rows re-apply stored values
    revision: u32,
}

impl App {
    fn refresh(&mut self) {
        self.workouts = Rc::new(self.tracker.workouts().to_vec());
    }

    fn report(&mut self, err: TrackerError) {
        error!(format!("{err}"));
        self.error = Some(err.to_string().into());
    }
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = TrackerConfig::from_build_env();
        let tracker = WorkoutTracker::open(BrowserStorage::local(), config);
        info!(format!("Loaded {} workouts", tracker.len()));

        geolocation::request_position(
            ctx.link().callback(Msg::Located),
            ctx.link().callback(Msg::LocationFailed),
        );

        let view = MapView::new(ViewTarget::Center(tracker.config().default_center));
        let workouts = Rc::new(tracker.workouts().to_vec());

        Self {
            tracker,
            workouts,
            pending: None,
            error: None,
            sort: SortKey::default(),
            view,
            revision: 0,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Located(coords) => {
                info!(format!("Located at {}, {}", coords.latitude(), coords.longitude()));
                self.view = self.view.next(ViewTarget::Center(coords));
            }
            Msg::LocationFailed(reason) => {
                error!(format!("Geolocation failed: {reason}"));
                if let Some(window) = web_sys::window() {
                    let _ = window.alert_with_message(NO_POSITION_ALERT);
                }
                return false;
            }
            Msg::MapClicked(coords) => {
                self.pending = Some(coords);
            }
            Msg::Submit(values) => {
                let Some(coords) = self.pending else {
                    return false;
                };

                match self.tracker.submit(coords, &values) {
                    Ok(workout) => {
                        info!(format!("Added {}", workout.description()));
                        self.pending = None;
                        self.error = None;
                    }
                    Err(err @ TrackerError::Validation(_)) => self.report(err),
                    Err(err) => {
                        // Kept in memory even though saving failed
                        self.pending = None;
                        self.report(err);
                    }
                }
                self.refresh();
            }
            Msg::Edit(FieldEdit { id, field, value }) => {
                if let Err(err) = self.tracker.edit(&id, field, &value) {
                    self.report(err);
                }
                self.revision = self.revision.wrapping_add(1);
                self.refresh();
            }
            Msg::Delete(id) => {
                if let Err(err) = self.tracker.delete(&id) {
                    self.report(err);
                }
                self.refresh();
            }
            Msg::Reset => {
                let confirmed = web_sys::window()
                    .and_then(|window| window.confirm_with_message(RESET_PROMPT).ok())
                    .unwrap_or(false);
                if !confirmed {
                    return false;
                }

                if let Err(err) = self.tracker.reset() {
                    self.report(err);
                }
                self.pending = None;
                self.refresh();
            }
            Msg::Select(id) => {
                match self.tracker.click(&id) {
                    Ok(workout) => {
                        self.view = self.view.next(ViewTarget::PanTo(workout.coords()));
                    }
                    Err(err) => self.report(err),
                }
                self.refresh();
            }
            Msg::Sort(sort) => {
                self.sort = sort;
            }
            Msg::ShowAll => {
                let Some((south_west, north_east)) = self.tracker.bounds() else {
                    return false;
                };
                self.view = self.view.next(ViewTarget::Fit(south_west, north_east));
            }
            Msg::DismissError => {
                self.error = None;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let sorted: Rc<Vec<Workout>> = Rc::new(self.tracker.sorted(self.sort).into_iter().cloned().collect());

        let on_sort = link.batch_callback(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            select.value().parse::<SortKey>().ok().map(Msg::Sort)
        });

        html! { <>
            <div class="sidebar">
                <ul class="workouts">
                    if self.pending.is_some() {
                        <WorkoutForm on_submit={link.callback(Msg::Submit)} />
                    }
                    <WorkoutList
                        workouts={sorted}
                        revision={self.revision}
                        on_edit={link.callback(Msg::Edit)}
                        on_delete={link.callback(Msg::Delete)}
                        on_select={link.callback(Msg::Select)}
                    />
                </ul>
                if !self.tracker.is_empty() {
                    <div class="controls">
                        <select class="sort__select" onchange={on_sort}>
                            { for SortKey::ALL.iter().map(|key| html! {
                                <option value={key.label()} selected={*key == self.sort}>
                                    {format!("Sort by {key}")}
                                </option>
                            }) }
                        </select>
                        <button class="show-all__button" onclick={link.callback(|_| Msg::ShowAll)}>
                            {"Show all"}
                        </button>
                        if self.tracker.len() > 1 {
                            <button class="delete__button" onclick={link.callback(|_| Msg::Reset)}>
                                {"Delete all"}
                            </button>
                        }
                    </div>
                }
                <ErrorPanel message={self.error.clone()} on_dismiss={link.callback(|()| Msg::DismissError)} />
            </div>
            <MapComponent
                config={self.tracker.config().clone()}
                workouts={self.workouts.clone()}
                view={self.view}
                on_click={link.callback(Msg::MapClicked)}
                on_marker_click={link.callback(Msg::Select)}
            />
        </> }
    }
}

fn main() {
    logging::init();
    tracing::info!("Starting workout tracker");
    yew::Renderer::<App>::new().render();
}
