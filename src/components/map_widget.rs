use std::rc::Rc;

use yew::prelude::*;

use crate::maps::web::LeafletBackend;
use crate::maps::MapBackend;
use crate::models::WidgetConfig;
use crate::services::{BrowserGeolocator, HttpStorageBackend};
use crate::state::{LifecycleController, MapServices, WidgetView};
use crate::utils::timers::BrowserScheduler;

#[derive(Properties, PartialEq)]
pub struct MapWidgetProps {
    pub config: WidgetConfig,
}

fn browser_services() -> MapServices {
    MapServices {
        storage: Rc::new(HttpStorageBackend::new()),
        geolocator: Rc::new(BrowserGeolocator),
        scheduler: Rc::new(BrowserScheduler),
        backend_factory: Rc::new(|| Box::new(LeafletBackend::new()) as Box<dyn MapBackend>),
    }
}

#[function_component(MapWidget)]
pub fn map_widget(props: &MapWidgetProps) -> Html {
    let view = use_state(|| WidgetView::Idle);
    let controller = use_mut_ref(|| None::<LifecycleController>);

    // Montaje / desmontaje (el contenedor ya está en el DOM cuando corre el efecto)
    {
        let controller = controller.clone();
        let view = view.clone();
        let config = props.config.clone();

        use_effect_with((), move |_| {
            let instance = LifecycleController::new(config, browser_services());
            {
                let view = view.clone();
                instance.status().subscribe(move |status| view.set(status.clone()));
            }
            instance.mount();
            view.set(instance.status().get());
            *controller.borrow_mut() = Some(instance);

            move || {
                let instance = controller.borrow_mut().take();
                if let Some(instance) = instance {
                    instance.unmount();
                }
            }
        });
    }

    // Cambios de configuración desde el dashboard
    {
        let controller = controller.clone();
        use_effect_with(props.config.clone(), move |config| {
            let instance = controller.borrow().clone();
            if let Some(instance) = instance {
                instance.update_config(config.clone());
            }
            || ()
        });
    }

    let clip = props
        .config
        .map
        .shape_clip
        .clip_path_css()
        .map(|css| format!("clip-path:{};", css))
        .unwrap_or_default();
    let style = format!("width:100%;height:100%;{}", clip);

    let overlay = match &*view {
        WidgetView::FetchError(message) => html! {
            <div class="map-widget__error">{ format!("Could not load location data: {}", message) }</div>
        },
        WidgetView::RenderError(message) => html! {
            <div class="map-widget__error">{ format!("Map could not be displayed: {}", message) }</div>
        },
        WidgetView::Loading => html! { <div class="map-widget__loading">{ "Loading…" }</div> },
        WidgetView::Empty => html! { <div class="map-widget__empty">{ "No location data" }</div> },
        WidgetView::Idle | WidgetView::Rendered { .. } => html! {},
    };

    html! {
        <div class="map-widget" style="position:relative;width:100%;height:100%;">
            <div id={props.config.container_id.clone()} class="map-widget__map" style={style}></div>
            { overlay }
        </div>
    }
}
