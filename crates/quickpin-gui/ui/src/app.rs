mod storage;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{
  DateTime,
  Utc
};
use gloo::events::EventListener;
use gloo::timers::future::TimeoutFuture;
use quickpin_shared::calendar::week_strip;
use quickpin_shared::flash::FLASH_DURATION_MS;
use quickpin_shared::overflow::DEFAULT_VISIBLE_ROWS;
use quickpin_shared::{
  Board,
  BoardError,
  CustomDate,
  DEFAULT_HISTORY_LIMIT,
  EditMode,
  PinOverflow,
  Session,
  Shortcut,
  SystemClock,
  TaskId
};
use wasm_bindgen::JsCast;
use web_sys::{
  Element,
  HtmlElement,
  HtmlInputElement
};
use yew::{
  Callback,
  Html,
  InputEvent,
  KeyboardEvent,
  MouseEvent,
  NodeRef,
  TargetCast,
  UseForceUpdateHandle,
  classes,
  function_component,
  html,
  use_effect,
  use_effect_with,
  use_force_update,
  use_mut_ref,
  use_node_ref,
  use_state,
  use_state_eq
};

use self::storage::LocalStore;
use crate::components::{
  CustomDateModal,
  PinArea,
  TaskList,
  WeekStrip
};

type UiSession =
  Session<LocalStore, SystemClock>;

/// Shared access to the session from
/// event callbacks and global
/// listeners. Every call re-renders.
#[derive(Clone)]
struct SessionHandle {
  session: Rc<RefCell<UiSession>>,
  refresh: UseForceUpdateHandle
}

impl SessionHandle {
  fn run<T>(
    &self,
    op: impl FnOnce(&mut UiSession) -> T
  ) -> T {
    let out =
      op(&mut self.session.borrow_mut());
    self.refresh.force_update();
    out
  }

  fn apply<T>(
    &self,
    op: impl FnOnce(
      &mut Board,
      DateTime<Utc>
    )
      -> Result<T, BoardError>
  ) -> Option<T> {
    match self
      .run(|session| session.apply(op))
    {
      | Ok(value) => Some(value),
      | Err(error) => {
        tracing::debug!(
          %error,
          "board rejected input"
        );
        self.schedule_flash_clear();
        None
      }
    }
  }

  /// Clears the input flash after its
  /// duration unless a newer flash
  /// replaced it in the meantime.
  fn schedule_flash_clear(&self) {
    let Some(raised) = self
      .session
      .borrow()
      .board()
      .flash()
      .raised_at()
    else {
      return;
    };

    let handle = self.clone();
    let millis =
      u32::try_from(FLASH_DURATION_MS)
        .unwrap_or(1_000);
    wasm_bindgen_futures::spawn_local(
      async move {
        TimeoutFuture::new(millis).await;
        handle.run(|session| {
          if session
            .board()
            .flash()
            .raised_at()
            == Some(raised)
          {
            session
              .update(Board::clear_flash);
          }
        });
      }
    );
  }
}

fn measure_overflow(
  area: &NodeRef,
  visible_rows: usize
) -> PinOverflow {
  let Some(container) =
    area.cast::<Element>()
  else {
    return PinOverflow::none();
  };

  let children = container.children();
  let offsets: Vec<i32> = (0
    ..children.length())
    .filter_map(|idx| children.item(idx))
    .filter(|el| {
      el.class_name()
        .split_whitespace()
        .any(|c| c == "pinned-item")
    })
    .filter_map(|el| {
      el.dyn_into::<HtmlElement>().ok()
    })
    .map(|el| {
      // Collapsed pins have no layout;
      // they sit past every visible row.
      let hidden = el
        .class_name()
        .split_whitespace()
        .any(|c| c == "hidden-pin");
      if hidden {
        i32::MAX
      } else {
        el.offset_top()
      }
    })
    .collect();

  PinOverflow::from_offsets(
    &offsets,
    visible_rows
  )
}

#[function_component(App)]
pub fn app() -> Html {
  let refresh = use_force_update();
  let session = use_mut_ref(|| {
    Session::open(
      LocalStore,
      SystemClock,
      DEFAULT_HISTORY_LIMIT
    )
  });
  let handle = SessionHandle {
    session: session.clone(),
    refresh
  };
  let custom_draft =
    use_state(|| None::<CustomDate>);
  let overflow =
    use_state_eq(PinOverflow::none);
  let measured_pins =
    use_mut_ref(|| None::<Vec<String>>);
  let pin_area = use_node_ref();
  let input_ref = use_node_ref();

  {
    use_effect_with((), move |_| {
      tracing::info!("app mounted");
      || ()
    });
  }

  {
    let handle = handle.clone();
    use_effect_with((), move |_| {
      let is_mac = web_sys::window()
        .and_then(|window| {
          window
            .navigator()
            .platform()
            .ok()
        })
        .is_some_and(|platform| {
          Shortcut::is_mac_platform(
            &platform
          )
        });

      let listener = web_sys::window()
        .map(|window| {
          EventListener::new(
            &window,
            "keydown",
            move |event| {
              let Some(event) = event
                .dyn_ref::<KeyboardEvent>()
              else {
                return;
              };
              let Some(shortcut) =
                Shortcut::from_key(
                  &event.key(),
                  event.ctrl_key(),
                  event.meta_key(),
                  event.shift_key(),
                  is_mac
                )
              else {
                return;
              };
              event.prevent_default();
              let changed =
                handle.run(|session| {
                  match shortcut {
                    | Shortcut::Undo => {
                      session.undo()
                    }
                    | Shortcut::Redo => {
                      session.redo()
                    }
                  }
                });
              tracing::debug!(
                ?shortcut,
                changed,
                "history shortcut"
              );
            }
          )
        });

      move || drop(listener)
    });
  }

  {
    let handle = handle.clone();
    use_effect_with((), move |_| {
      let listener = web_sys::window()
        .and_then(|window| {
          window.document()
        })
        .map(|document| {
          EventListener::new(
            &document,
            "click",
            move |event| {
              let Some(armed) = handle
                .session
                .borrow()
                .board()
                .pending_delete()
                .armed_id()
              else {
                return;
              };
              let inside = event
                .target()
                .and_then(|target| {
                  target
                    .dyn_into::<Element>()
                    .ok()
                })
                .and_then(|el| {
                  el.closest(
                    "[data-pending-id]"
                  )
                  .ok()
                  .flatten()
                })
                .and_then(|el| {
                  el.get_attribute(
                    "data-pending-id"
                  )
                })
                .is_some_and(|value| {
                  value == armed.to_string()
                });
              if !inside {
                handle.run(|session| {
                  session.update(
                    Board::dismiss_pending_delete
                  )
                });
              }
            }
          )
        });

      move || drop(listener)
    });
  }

  {
    let overflow = overflow.clone();
    use_effect_with((), move |_| {
      let listener = web_sys::window()
        .map(|window| {
          EventListener::new(
            &window,
            "resize",
            move |_| {
              overflow
                .set(PinOverflow::none())
            }
          )
        });

      move || drop(listener)
    });
  }

  let (
    view,
    today,
    pins,
    show_all,
    week_offset,
    selected,
    input_title,
    editing,
    flashing
  ) = {
    let session = session.borrow();
    let board = session.board();
    (
      session.view(),
      session.today(),
      board.pins().as_slice().to_vec(),
      board.show_all_pins(),
      board.week_offset(),
      board.input().selected_date,
      board.input().title.clone(),
      matches!(
        board.edit_mode(),
        EditMode::Editing { .. }
      ),
      board.flash().raised_at().is_some()
    )
  };

  {
    let pin_area = pin_area.clone();
    let overflow = overflow.clone();
    let measured_pins =
      measured_pins.clone();
    let pins = pins.clone();
    use_effect(move || {
      let changed =
        measured_pins.borrow().as_ref()
          != Some(&pins);
      if changed {
        *measured_pins.borrow_mut() =
          Some(pins);
      }
      // A changed pin list is measured
      // with nothing collapsed.
      if changed
        && overflow
          .first_hidden()
          .is_some()
      {
        overflow.set(PinOverflow::none());
      } else {
        overflow.set(measure_overflow(
          &pin_area,
          DEFAULT_VISIBLE_ROWS
        ));
      }
      || ()
    });
  }

  let on_input = {
    let handle = handle.clone();
    Callback::from(move |e: InputEvent| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      handle.run(|session| {
        session.update(|board| {
          board
            .set_input_title(input.value())
        })
      });
    })
  };

  let on_keydown = {
    let handle = handle.clone();
    Callback::from(
      move |e: KeyboardEvent| {
        match e.key().as_str() {
          | "Enter" => {
            handle.apply(|board, now| {
              board.submit(now)
            });
          }
          | "Escape" => {
            handle.run(|session| {
              session
                .update(Board::cancel_edit)
            });
          }
          | _ => {}
        }
      }
    )
  };

  let on_submit = {
    let handle = handle.clone();
    Callback::from(move |_: MouseEvent| {
      handle.apply(|board, now| {
        board.submit(now)
      });
    })
  };

  let on_pin = {
    let handle = handle.clone();
    Callback::from(move |_: MouseEvent| {
      handle.apply(|board, now| {
        board.add_pin_from_input(now)
      });
    })
  };

  let on_cancel_edit = {
    let handle = handle.clone();
    Callback::from(move |_: MouseEvent| {
      handle.run(|session| {
        session.update(Board::cancel_edit)
      });
    })
  };

  let on_primary = {
    let handle = handle.clone();
    Callback::from(move |id: TaskId| {
      handle.apply(|board, now| {
        board.primary_action(id, now)
      });
    })
  };

  let on_secondary = {
    let handle = handle.clone();
    Callback::from(move |id: TaskId| {
      if let Some(outcome) = handle
        .apply(|board, _| {
          board.secondary_action(id)
        })
      {
        tracing::debug!(
          ?outcome,
          "secondary action"
        );
      }
    })
  };

  let on_edit = {
    let handle = handle.clone();
    let input_ref = input_ref.clone();
    Callback::from(move |id: TaskId| {
      if handle
        .apply(|board, _| {
          board.start_edit(id)
        })
        .is_some()
        && let Some(input) = input_ref
          .cast::<HtmlInputElement>()
      {
        let _ = input.focus();
      }
    })
  };

  let on_use_pin = {
    let handle = handle.clone();
    Callback::from(move |text: String| {
      handle.apply(|board, _| {
        board.use_pin(&text)
      });
    })
  };

  let on_remove_pin = {
    let handle = handle.clone();
    Callback::from(move |text: String| {
      handle.apply(|board, _| {
        board.remove_pin(&text)
      });
    })
  };

  let on_toggle_pins = {
    let handle = handle.clone();
    Callback::from(move |()| {
      handle.run(|session| {
        session.update(
          Board::toggle_show_all_pins
        )
      });
    })
  };

  let on_shift_week = {
    let handle = handle.clone();
    Callback::from(move |delta: i32| {
      handle.run(|session| {
        session.update(|board| {
          board.shift_week(delta)
        })
      });
    })
  };

  let on_select_date = {
    let handle = handle.clone();
    Callback::from(move |date| {
      handle.run(|session| {
        session.update(|board| {
          board.select_date(date)
        })
      });
    })
  };

  let on_open_custom = {
    let custom_draft =
      custom_draft.clone();
    Callback::from(move |()| {
      custom_draft.set(Some(
        CustomDate::today(&SystemClock)
      ));
    })
  };

  let modal = match (*custom_draft)
    .clone()
  {
    | Some(draft) => {
      let on_change = {
        let custom_draft =
          custom_draft.clone();
        Callback::from(
          move |next: CustomDate| {
            custom_draft.set(Some(next))
          }
        )
      };
      let on_apply = {
        let custom_draft =
          custom_draft.clone();
        let handle = handle.clone();
        let draft = draft.clone();
        Callback::from(move |()| {
          if handle
            .apply(|board, _| {
              board
                .apply_custom_date(&draft)
            })
            .is_some()
          {
            custom_draft.set(None);
          }
        })
      };
      let on_close = {
        let custom_draft =
          custom_draft.clone();
        Callback::from(move |()| {
          custom_draft.set(None)
        })
      };
      html! {
          <CustomDateModal
              draft={draft}
              on_change={on_change}
              on_apply={on_apply}
              on_close={on_close}
          />
      }
    }
    | None => html! {}
  };

  html! {
      <div class="app-container" role="application">
          <main class="main-content">
              <div class="input-group">
                  <input
                      ref={input_ref}
                      id="new-todo-title"
                      class={classes!(flashing.then_some("error"))}
                      placeholder="Type a task title..."
                      value={input_title}
                      oninput={on_input}
                      onkeydown={on_keydown}
                  />
                  <button class="action-button pin-button" title="Pin the typed text" onclick={on_pin}>
                      { "📌" }
                  </button>
                  <button
                      class="action-button add-button"
                      title={if editing { "Save edit" } else { "Add task" }}
                      onclick={on_submit}
                  >
                      { if editing { "✓" } else { "+" } }
                  </button>
                  {
                      if editing {
                          html! {
                              <button class="action-button cancel-button" title="Cancel" onclick={on_cancel_edit}>
                                  { "✕" }
                              </button>
                          }
                      } else {
                          html! {}
                      }
                  }
              </div>

              <WeekStrip
                  days={week_strip(today, week_offset)}
                  week_offset={week_offset}
                  selected={selected}
                  on_shift_week={on_shift_week}
                  on_select={on_select_date}
                  on_open_custom={on_open_custom}
              />

              <PinArea
                  pins={pins}
                  overflow={*overflow}
                  show_all={show_all}
                  area_ref={pin_area}
                  on_use={on_use_pin}
                  on_remove={on_remove_pin}
                  on_toggle={on_toggle_pins}
              />

              <section class="task-display-area">
                  <TaskList
                      title="Open"
                      empty_text="No open tasks"
                      rows={view.active}
                      on_primary={on_primary.clone()}
                      on_secondary={on_secondary.clone()}
                      on_edit={Some(on_edit)}
                  />
                  <TaskList
                      title="Done"
                      empty_text="No finished tasks"
                      rows={view.done}
                      on_primary={on_primary}
                      on_secondary={on_secondary}
                  />
              </section>
          </main>
          { modal }
      </div>
  }
}
