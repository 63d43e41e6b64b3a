use quickpin_shared::PinOverflow;
use yew::{
  Callback,
  Html,
  NodeRef,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct PinAreaProps {
  pub pins:        Vec<String>,
  pub overflow:    PinOverflow,
  pub show_all:    bool,
  pub area_ref:    NodeRef,
  pub on_use:      Callback<String>,
  pub on_remove:   Callback<String>,
  pub on_toggle:   Callback<()>
}

#[function_component(PinArea)]
pub fn pin_area(
  props: &PinAreaProps
) -> Html {
  let toggle = props
    .overflow
    .toggle_label(
      props.pins.len(),
      props.show_all
    );
  let on_toggle =
    props.on_toggle.clone();

  html! {
      <section ref={props.area_ref.clone()} class="pinned-list-area">
          {
              for props.pins.iter().enumerate().map(|(idx, pin)| {
                  let hidden = props.overflow.is_hidden(idx, props.show_all);
                  let on_use = props.on_use.clone();
                  let on_remove = props.on_remove.clone();
                  let use_text = pin.clone();
                  let remove_text = pin.clone();
                  html! {
                      <span
                          key={pin.clone()}
                          class={classes!("pinned-item", hidden.then_some("hidden-pin"))}
                          title="Click to use, right-click to remove"
                          onclick={move |_| on_use.emit(use_text.clone())}
                          oncontextmenu={move |e: yew::MouseEvent| {
                              e.prevent_default();
                              on_remove.emit(remove_text.clone());
                          }}
                      >
                          { pin }
                      </span>
                  }
              })
          }
          {
              match toggle {
                  Some(label) => html! {
                      <button class="pin-toggle-button" onclick={move |_| on_toggle.emit(())}>
                          { label }
                      </button>
                  },
                  None => html! {},
              }
          }
      </section>
  }
}
