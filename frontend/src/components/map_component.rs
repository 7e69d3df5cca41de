use std::{collections::HashMap, rc::Rc};

use gloo_console::info;
use gloo_utils::document;
use leaflet::{LatLng, Map, MapOptions, Marker, Popup, PopupOptions, TileLayer, TileLayerOptions};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
use web_sys::{js_sys::{Array, Object, Reflect}, Element, HtmlElement, Node};
use workout_tracker_lib::{
    workout::{Workout, WorkoutId, WorkoutType},
    Coords, TrackerConfig,
};
use yew::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Any Leaflet object, for the few calls made with plain JS options.
    type LeafletObject;

    #[wasm_bindgen(method)]
    fn on(this: &LeafletObject, event: &str, handler: &JsValue);

    #[wasm_bindgen(method, js_name = openPopup)]
    fn open_popup(this: &LeafletObject);

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view_with_options(this: &LeafletObject, center: &LatLng, zoom: f64, options: &JsValue);

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds(this: &LeafletObject, bounds: &JsValue, options: &JsValue);
}

/// Where the map should look. Applied whenever `seq` changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub seq: u32,
    pub target: ViewTarget,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewTarget {
    Center(Coords),
    /// Animated pan to a workout
    PanTo(Coords),
    /// South-west and north-east corners
    Fit(Coords, Coords),
}

impl MapView {
    pub fn new(target: ViewTarget) -> Self {
        Self { seq: 0, target }
    }

    pub fn next(self, target: ViewTarget) -> Self {
        Self { seq: self.seq.wrapping_add(1), target }
    }
}

pub enum Msg {
    MapClicked(Coords),
    MarkerClicked(WorkoutId),
}

struct PlacedMarker {
    marker: Marker,
    _on_click: Closure<dyn Fn(JsValue)>,
}

pub struct MapComponent {
    map: Map,
    container: HtmlElement,
    markers: HashMap<WorkoutId, PlacedMarker>,
    on_click: Option<Closure<dyn Fn(JsValue)>>,
}

#[derive(PartialEq, Properties, Clone)]
pub struct Props {
    pub config: TrackerConfig,
    pub workouts: Rc<Vec<Workout>>,
    pub view: MapView,
    pub on_click: Callback<Coords>,
    pub on_marker_click: Callback<WorkoutId>,
}

impl MapComponent {
    fn render_map(&self) -> Html {
        let node: &Node = &self.container.clone().into();
        Html::VRef(node.clone())
    }

    fn apply_view(&self, view: &MapView, zoom: f64) {
        let map: &LeafletObject = self.map.unchecked_ref();
        match view.target {
            ViewTarget::Center(coords) => {
                self.map.set_view(&lat_lng(coords), zoom);
            }
            ViewTarget::PanTo(coords) => {
                let pan = Object::new();
                set_option(&pan, "duration", &JsValue::from(1.));
                let options = Object::new();
                set_option(&options, "animate", &JsValue::TRUE);
                set_option(&options, "pan", &pan);
                map.set_view_with_options(&lat_lng(coords), zoom, &options);
            }
            ViewTarget::Fit(south_west, north_east) => {
                let bounds = Array::of2(&corner(south_west), &corner(north_east));
                let options = Object::new();
                set_option(&options, "padding", &Array::of2(&JsValue::from(40.), &JsValue::from(40.)));
                set_option(&options, "maxZoom", &JsValue::from(zoom));
                map.fit_bounds(&bounds, &options);
            }
        }
    }

    /// Adds markers for new workouts and removes markers of deleted ones.
    fn sync_markers(&mut self, ctx: &Context<Self>) {
        let workouts = &ctx.props().workouts;

        self.markers.retain(|id, placed| {
            let keep = workouts.iter().any(|w| w.id() == id);
            if !keep {
                placed.marker.remove();
            }
            keep
        });

        for workout in workouts.iter() {
            if !self.markers.contains_key(workout.id()) {
                let placed = self.place_marker(ctx, workout);
                self.markers.insert(workout.id().clone(), placed);
            }
        }
    }

    fn place_marker(&self, ctx: &Context<Self>, workout: &Workout) -> PlacedMarker {
        info!(format!("Adding marker for {}", workout.id()));
        let workout_type = workout.workout_type();

        let popup = Popup::new(&popup_options(workout_type), None);
        popup.set_content(&format!("{} {}", workout_type.emoji(), workout.description()).into());

        let marker = Marker::new(&lat_lng(workout.coords()));
        marker.bind_popup(&popup);
        marker.add_to(&self.map);

        let id = workout.id().clone();
        let link = ctx.link().clone();
        let on_click = Closure::<dyn Fn(JsValue)>::new(move |_event: JsValue| {
            link.send_message(Msg::MarkerClicked(id.clone()));
        });

        let handle: &LeafletObject = marker.unchecked_ref();
        handle.on("click", on_click.as_ref());
        handle.open_popup();

        PlacedMarker { marker, _on_click: on_click }
    }
}

impl Component for MapComponent {
    type Message = Msg;
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        let container: Element = document().create_element("div").expect("Document can create elements");
        let container: HtmlElement = container.unchecked_into();
        container.set_class_name("map");

        let leaflet_map = Map::new_with_element(&container, &MapOptions::default());

        Self {
            map: leaflet_map,
            container,
            markers: HashMap::new(),
            on_click: None,
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            let props = ctx.props();
            self.map.set_max_zoom(19.);
            self.apply_view(&props.view, props.config.map_zoom);
            add_tile_layer(&self.map, &props.config);

            let link = ctx.link().clone();
            let on_click = Closure::<dyn Fn(JsValue)>::new(move |event: JsValue| {
                if let Some(coords) = event_coords(&event) {
                    link.send_message(Msg::MapClicked(coords));
                }
            });
            self.map.unchecked_ref::<LeafletObject>().on("click", on_click.as_ref());
            self.on_click = Some(on_click);

            // Workouts loaded from storage arrive before the map exists
            self.sync_markers(ctx);
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::MapClicked(coords) => ctx.props().on_click.emit(coords),
            Msg::MarkerClicked(id) => ctx.props().on_marker_click.emit(id),
        }
        false
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        self.map.invalidate_size(false);
        let props = ctx.props();

        if props.workouts != old_props.workouts {
            self.sync_markers(ctx);
        }

        if props.view.seq != old_props.view.seq {
            self.apply_view(&props.view, props.config.map_zoom);
        }

        false
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <div id="map">
                {self.render_map()}
            </div>
        }
    }
}

fn lat_lng(coords: Coords) -> LatLng {
    LatLng::new(coords.latitude(), coords.longitude())
}

fn corner(coords: Coords) -> JsValue {
    Array::of2(&JsValue::from(coords.latitude()), &JsValue::from(coords.longitude())).into()
}

fn set_option(target: &JsValue, key: &str, value: &JsValue) {
    let _ = Reflect::set(target, &JsValue::from_str(key), value);
}

fn event_coords(event: &JsValue) -> Option<Coords> {
    let latlng = Reflect::get(event, &JsValue::from_str("latlng")).ok()?;
    let lat = Reflect::get(&latlng, &JsValue::from_str("lat")).ok()?.as_f64()?;
    let lng = Reflect::get(&latlng, &JsValue::from_str("lng")).ok()?.as_f64()?;
    Some(Coords::new(lat, lng))
}

fn popup_options(workout_type: WorkoutType) -> PopupOptions {
    let opts = PopupOptions::default();
    set_option(&opts, "maxWidth", &JsValue::from(250.));
    set_option(&opts, "minWidth", &JsValue::from(100.));
    set_option(&opts, "autoClose", &JsValue::FALSE);
    set_option(&opts, "closeOnClick", &JsValue::FALSE);
    set_option(&opts, "className", &JsValue::from_str(&format!("{}-popup", workout_type.label())));
    opts
}

fn add_tile_layer(map: &Map, config: &TrackerConfig) {
    let opts = TileLayerOptions::new();
    opts.set_update_when_idle(true);
    set_option(&opts, "attribution", &JsValue::from_str(&config.tile_attribution));
    TileLayer::new_options(&config.tile_url, &opts).add_to(map);
}
