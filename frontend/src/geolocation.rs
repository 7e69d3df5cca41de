use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{js_sys::Function, GeolocationPosition, GeolocationPositionError};
use workout_tracker_lib::Coords;
use yew::Callback;

/// Asks the browser for the current position once. Exactly one of the
/// callbacks fires.
pub fn request_position(on_found: Callback<Coords>, on_failed: Callback<String>) {
    let geolocation = web_sys::window()
        .ok_or_else(|| "No window".to_owned())
        .and_then(|window| window.navigator().geolocation().map_err(|_| "Geolocation is not supported".to_owned()));

    let geolocation = match geolocation {
        Ok(geolocation) => geolocation,
        Err(reason) => {
            on_failed.emit(reason);
            return;
        }
    };

    let success = Closure::once_into_js(move |position: GeolocationPosition| {
        let coords = position.coords();
        on_found.emit(Coords::new(coords.latitude(), coords.longitude()));
    });

    let failed = on_failed.clone();
    let failure = Closure::once_into_js(move |err: GeolocationPositionError| {
        failed.emit(err.message());
    });

    if let Err(err) = geolocation.get_current_position_with_error_callback(
        success.unchecked_ref::<Function>(),
        Some(failure.unchecked_ref::<Function>()),
    ) {
        on_failed.emit(format!("{err:?}"));
    }
}
