use crate::api::{ApiError, ItemPatch};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Input, Label, Spinner,
};
use crate::media::{upload_list_media, MediaPurpose};
use crate::models::Item;
use crate::ordering::{self, MoveDirection};
use crate::realtime::{self, ChangeSubscription};
use crate::state::sync::{self, Recovery};
use crate::state::AppContext;
use crate::storage::save_user_to_storage;
use crate::util::{normalize_email, remaining_label};
use icons::{ChevronDown, ChevronUp, X};
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use leptos_router::hooks::use_navigate;
use leptos_router::params::Params;
use wasm_bindgen::JsCast;

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let mut api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.login(&email_val, &password_val).await {
                Ok(response) => {
                    api_client.set_token(response.token);
                    api_client.save_to_storage();
                    save_user_to_storage(&response.account);
                    app_state.0.api_client.set(api_client);
                    app_state.0.current_user.set(Some(response.account));
                    let _ = window().location().set_href("/");
                }
                Err(e) => {
                    // 401 here means bad credentials (or an unconfirmed
                    // account), not an expired session.
                    if e.is_unauthorized() {
                        error.set(Some("Invalid email or password".to_string()));
                    } else {
                        error.set(Some(e.to_string()));
                    }
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"Listling"</a>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Log in"</CardTitle>
                        <CardDescription class="text-xs">"Use your email and password to continue."</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email" class="text-xs">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| {
                                        view! {
                                            <Alert class="border-destructive/30">
                                                <AlertDescription class="text-destructive text-xs">
                                                    {e}
                                                </AlertDescription>
                                            </Alert>
                                        }
                                    })
                                }}
                            </Show>

                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Continue" }}
                                </span>
                            </Button>

                            <div class="pt-1 text-xs text-muted-foreground">
                                "No account? "
                                <a class="text-primary underline underline-offset-4" href="/signup">"Sign up"</a>
                            </div>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn RegistrationPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let confirm_password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);
    let success: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let confirm_password_val = confirm_password.get();
        let api_client = app_state.0.api_client.get_untracked();

        if password_val != confirm_password_val {
            error.set(Some("Passwords do not match".to_string()));
            return;
        }

        if password_val.len() < 6 {
            error.set(Some("Password must be at least 6 characters".to_string()));
            return;
        }

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.signup(&email_val, &password_val).await {
                Ok(_response) => {
                    // Backend returns a token on signup; we keep UX simple and ask user to sign in.
                    success.set(true);
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"Listling"</a>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Create account"</CardTitle>
                        <CardDescription class="text-xs">"Lists you create or join follow your account."</CardDescription>
                    </CardHeader>
                    <CardContent>

                    <Show
                        when=move || !success.get()
                        fallback=move || view! {
                            <Alert>
                                <AlertDescription class="text-xs">
                                    "Account created. You can now "
                                    <a class="text-primary underline underline-offset-4" href="/login">"log in"</a>
                                    "."
                                </AlertDescription>
                            </Alert>
                        }
                    >
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email" class="text-xs">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="confirm_password" class="text-xs">"Confirm password"</Label>
                                <Input
                                    id="confirm_password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=confirm_password
                                    required=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| {
                                        view! {
                                            <Alert class="border-destructive/30">
                                                <AlertDescription class="text-destructive text-xs">
                                                    {e}
                                                </AlertDescription>
                                            </Alert>
                                        }
                                    })
                                }}
                            </Show>

                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Creating..." } else { "Continue" }}
                                </span>
                            </Button>

                            <div class="pt-1 text-xs text-muted-foreground">
                                "Already have an account? "
                                <a class="text-primary underline underline-offset-4" href="/login">"Log in"</a>
                            </div>
                        </form>
                    </Show>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn RootAuthed(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    // Reactive: flips back to the login screen on any auth-state change
    // (explicit sign-out or a 401-triggered logout).
    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    view! {
        <Show when=is_authenticated fallback=move || view! { <LoginPage /> }>
            {move || children.with_value(|c| c())}
        </Show>
    }
}

#[component]
pub fn RootPage() -> impl IntoView {
    view! {
        <RootAuthed>
            <ListsPage />
        </RootAuthed>
    }
}

#[derive(Params, PartialEq, Clone, Debug)]
pub struct ListRouteParams {
    pub list_id: Option<String>,
}

#[component]
pub fn ListsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let lists = app_state.0.lists;
    let lists_loading = app_state.0.lists_loading;
    let lists_error = app_state.0.lists_error;
    let counts = app_state.0.counts;

    // Create modal (creation is NOT optimistic: the backend assigns the id).
    let create_open: RwSignal<bool> = RwSignal::new(false);
    let create_name: RwSignal<String> = RwSignal::new(String::new());
    let create_icon: RwSignal<String> = RwSignal::new(String::new());
    let create_loading: RwSignal<bool> = RwSignal::new(false);
    let create_error: RwSignal<Option<String>> = RwSignal::new(None);
    let create_name_ref: NodeRef<html::Input> = NodeRef::new();

    // Rename modal.
    let rename_open: RwSignal<bool> = RwSignal::new(false);
    let rename_target: RwSignal<String> = RwSignal::new(String::new());
    let rename_value: RwSignal<String> = RwSignal::new(String::new());
    let rename_loading: RwSignal<bool> = RwSignal::new(false);
    let rename_error: RwSignal<Option<String>> = RwSignal::new(None);

    // Delete confirm modal.
    let delete_open: RwSignal<bool> = RwSignal::new(false);
    let delete_target: RwSignal<String> = RwSignal::new(String::new());
    let delete_name: RwSignal<String> = RwSignal::new(String::new());

    // Drag state: id of the row being dragged, and whether any splice
    // happened (no splice → no write on release).
    let drag_list_id: RwSignal<Option<String>> = RwSignal::new(None);
    let drag_dirty: RwSignal<bool> = RwSignal::new(false);

    let load_lists_sv = StoredValue::new(move |force: bool| {
        if !force {
            let has_error = lists_error.get_untracked().is_some();
            let is_loading = lists_loading.get_untracked();
            if !lists.get_untracked().is_empty() && !has_error && !is_loading {
                return;
            }
        }

        let req_id = app_state
            .0
            .lists_request_id
            .get_untracked()
            .saturating_add(1);
        app_state.0.lists_request_id.set(req_id);

        lists_loading.set(true);
        lists_error.set(None);

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            let result = api_client.get_lists().await;

            // Ignore stale responses.
            if app_state.0.lists_request_id.get_untracked() != req_id {
                return;
            }

            match result {
                Ok(mut rows) => {
                    ordering::sort_lists(&mut rows);
                    let ids: Vec<String> = rows.iter().map(|l| l.id.clone()).collect();
                    lists.set(rows);
                    lists_loading.set(false);

                    // Derived aggregates: one secondary query per list.
                    for id in ids {
                        match api_client.get_list_counts(&id).await {
                            Ok(c) => {
                                if app_state.0.lists_request_id.get_untracked() != req_id {
                                    return;
                                }
                                counts.update(|m| {
                                    m.insert(id.clone(), c);
                                });
                            }
                            Err(_) => {
                                // Counts are cosmetic; leave the stale value.
                            }
                        }
                    }
                }
                Err(e) => {
                    if e.is_unauthorized() {
                        let mut c = app_state.0.api_client.get_untracked();
                        c.logout();
                        app_state.0.api_client.set(c);
                        app_state.0.current_user.set(None);
                        let _ = window().location().set_href("/login");
                    } else {
                        lists_error.set(Some(e.to_string()));
                    }
                    lists_loading.set(false);
                }
            }
        });
    });

    Effect::new(move |_| {
        load_lists_sv.with_value(|f| f(false));
    });

    // Live invalidation: any change to lists or memberships re-fetches the
    // whole collection (coarse, but these collections are small).
    let subscription = StoredValue::new_local(None::<ChangeSubscription>);
    Effect::new(move |_| {
        subscription.update_value(|s| {
            if let Some(s) = s.take() {
                s.close();
            }
        });

        let api_client = app_state.0.api_client.get_untracked();
        let sub = realtime::subscribe(
            &api_client.base_url,
            api_client.get_auth_token(),
            &["lists", "memberships"],
            None,
            move || {
                load_lists_sv.with_value(|f| f(true));
            },
        );
        subscription.set_value(sub);
    });
    on_cleanup(move || {
        subscription.update_value(|s| {
            if let Some(s) = s.take() {
                s.close();
            }
        });
    });

    // Escape closes whichever modal is open.
    let _key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" {
            create_open.set(false);
            rename_open.set(false);
            delete_open.set(false);
        }
    });

    let on_logout = move |_| {
        let mut api_client = app_state.0.api_client.get_untracked();
        api_client.logout();
        app_state.0.api_client.set(api_client);
        app_state.0.current_user.set(None);
        let _ = window().location().set_href("/login");
    };

    let open_create = move |_: web_sys::MouseEvent| {
        create_name.set(String::new());
        create_icon.set(String::new());
        create_error.set(None);
        create_open.set(true);

        if let Some(el) = create_name_ref.get_untracked() {
            let _ = el.focus();
        }
    };

    let submit_create = move || {
        if create_loading.get_untracked() {
            return;
        }

        let name = create_name.get_untracked();
        if name.trim().is_empty() {
            create_error.set(Some("Name cannot be empty".to_string()));
            return;
        }
        let icon = create_icon.get_untracked();

        let api_client = app_state.0.api_client.get_untracked();
        create_loading.set(true);
        create_error.set(None);

        spawn_local(async move {
            match api_client.create_list(name.trim(), icon.trim()).await {
                Ok(row) => {
                    lists.update(|xs| {
                        xs.push(row);
                        ordering::sort_lists(xs);
                    });
                    create_open.set(false);
                }
                Err(e) => create_error.set(Some(e.to_string())),
            }
            create_loading.set(false);
        });
    };

    let submit_rename = move || {
        if rename_loading.get_untracked() {
            return;
        }

        let id = rename_target.get_untracked();
        let new_name = rename_value.get_untracked();
        if new_name.trim().is_empty() {
            rename_error.set(Some("Name cannot be empty".to_string()));
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        rename_loading.set(true);
        rename_error.set(None);

        spawn_local(async move {
            match api_client.rename_list(&id, new_name.trim()).await {
                Ok(_) => {
                    lists.update(|xs| {
                        if let Some(l) = xs.iter_mut().find(|l| l.id == id) {
                            l.name = new_name.trim().to_string();
                        }
                    });
                    rename_open.set(false);
                }
                Err(e) => rename_error.set(Some(e.to_string())),
            }
            rename_loading.set(false);
        });
    };

    let submit_delete = move || {
        let id = delete_target.get_untracked();
        if id.trim().is_empty() {
            return;
        }
        delete_open.set(false);

        let api_client = app_state.0.api_client.get_untracked();
        let id_for_write = id.clone();
        sync::run_optimistic(
            lists,
            move |xs| xs.retain(|l| l.id != id),
            async move { api_client.delete_list(&id_for_write).await },
            Recovery::Refetch(Callback::new(move |_| {
                load_lists_sv.with_value(|f| f(true));
            })),
            move |e: ApiError| lists_error.set(Some(e.to_string())),
        );
    };

    let move_list = move |id: String, dir: MoveDirection| {
        let ordered = ordering::ordered_list_ids(&lists.get_untracked());
        // Boundary: nothing to write.
        let Some(writes) = ordering::step_move(&ordered, &id, dir) else {
            return;
        };

        let api_client = app_state.0.api_client.get_untracked();
        let writes_for_apply = writes.clone();
        sync::run_optimistic(
            lists,
            move |xs| {
                ordering::apply_list_positions(xs, &writes_for_apply);
                ordering::sort_lists(xs);
            },
            async move { api_client.reorder_lists(&writes).await },
            Recovery::Refetch(Callback::new(move |_| {
                load_lists_sv.with_value(|f| f(true));
            })),
            move |e: ApiError| lists_error.set(Some(e.to_string())),
        );
    };

    // Drag release: the spliced order is already local state; persist the
    // whole collection's positions in one batch, or roll back to the
    // authoritative order if the write fails.
    let finish_drag = move || {
        let was_dirty = drag_dirty.get_untracked();
        drag_list_id.set(None);
        drag_dirty.set(false);

        if !was_dirty {
            return;
        }

        let writes = ordering::renumber(&ordering::ordered_list_ids(&lists.get_untracked()));
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            if let Err(e) = api_client.reorder_lists(&writes).await {
                lists_error.set(Some(e.to_string()));
                load_lists_sv.with_value(|f| f(true));
            }
        });
    };

    let user_email = move || {
        app_state
            .0
            .current_user
            .get()
            .and_then(|u| u.email().map(|s| s.to_string()))
            .unwrap_or_default()
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-2xl px-4 py-8">
                <div class="mb-4 flex items-center justify-between">
                    <div class="space-y-1">
                        <h1 class="text-xl font-semibold">"Listling"</h1>
                        <p class="text-xs text-muted-foreground">{user_email}</p>
                    </div>

                    <div class="flex items-center gap-2">
                        <Button size=ButtonSize::Sm on:click=open_create>
                            "New list"
                        </Button>

                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || lists_loading.get()
                            on:click=move |_| load_lists_sv.with_value(|f| f(true))
                        >
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || lists_loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if lists_loading.get() { "Refreshing" } else { "Refresh" }}
                            </span>
                        </Button>

                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            class="text-muted-foreground"
                            on:click=on_logout
                        >
                            "Sign out"
                        </Button>
                    </div>
                </div>

                <Show when=move || lists_error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        lists_error.get().map(|e| view! {
                            <Alert class="mb-3 border-destructive/30">
                                <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                            </Alert>
                        })
                    }}
                </Show>

                <Show
                    when=move || !lists.get().is_empty()
                    fallback=move || view! {
                        <div class="rounded-md border border-dashed border-border px-4 py-10 text-center text-sm text-muted-foreground">
                            {move || if lists_loading.get() {
                                "Loading lists..."
                            } else {
                                "No lists yet. Create one to get started."
                            }}
                        </div>
                    }
                >
                    <ul class="flex flex-col gap-2">
                        {move || {
                            let mut rows = lists.get();
                            ordering::sort_lists(&mut rows);
                            let last_idx = rows.len().saturating_sub(1);

                            rows.into_iter()
                                .enumerate()
                                .map(|(idx, l)| {
                                    let id = l.id.clone();
                                    let name = l.name.clone();
                                    let icon = l.icon.clone();
                                    let icon_url = l.icon_url.clone();

                                    let id_for_nav = id.clone();
                                    let id_for_rename = id.clone();
                                    let name_for_rename = name.clone();
                                    let id_for_delete = id.clone();
                                    let name_for_delete = name.clone();
                                    let id_for_up = id.clone();
                                    let id_for_down = id.clone();
                                    let id_for_dragstart = id.clone();
                                    let id_for_dragover = id.clone();

                                    let counts_label = move || {
                                        counts
                                            .get()
                                            .get(&id)
                                            .map(|c| remaining_label(c.unchecked, c.total))
                                            .unwrap_or_default()
                                    };

                                    view! {
                                        <li
                                            class="group flex cursor-pointer items-center gap-3 rounded-md border border-border bg-card px-3 py-2 transition-colors hover:bg-accent/40"
                                            draggable="true"
                                            on:dragstart=move |ev: web_sys::DragEvent| {
                                                if let Some(dt) = ev.data_transfer() {
                                                    let _ = dt.set_data("text/plain", &id_for_dragstart);
                                                    dt.set_drop_effect("move");
                                                }
                                                drag_list_id.set(Some(id_for_dragstart.clone()));
                                                drag_dirty.set(false);
                                            }
                                            on:dragover=move |ev: web_sys::DragEvent| {
                                                ev.prevent_default();
                                                let Some(dragged) = drag_list_id.get_untracked() else {
                                                    return;
                                                };

                                                let ordered = ordering::ordered_list_ids(&lists.get_untracked());
                                                if let Some(writes) = ordering::splice(&ordered, &dragged, &id_for_dragover) {
                                                    lists.update(|xs| {
                                                        ordering::apply_list_positions(xs, &writes);
                                                        ordering::sort_lists(xs);
                                                    });
                                                    drag_dirty.set(true);
                                                }
                                            }
                                            on:drop=move |ev: web_sys::DragEvent| {
                                                ev.prevent_default();
                                            }
                                            on:dragend=move |_ev: web_sys::DragEvent| {
                                                finish_drag();
                                            }
                                            on:click=move |_| {
                                                navigate.with_value(|nav| {
                                                    nav(&format!("/list/{}", id_for_nav), Default::default());
                                                });
                                            }
                                        >
                                            <div class="flex h-8 w-8 shrink-0 items-center justify-center rounded-md border border-border bg-background text-base">
                                                {match icon_url {
                                                    Some(url) => view! {
                                                        <img src=url class="h-full w-full rounded-md object-cover" />
                                                    }.into_any(),
                                                    None => view! {
                                                        <span>{if icon.is_empty() { "📋".to_string() } else { icon }}</span>
                                                    }.into_any(),
                                                }}
                                            </div>

                                            <div class="min-w-0 flex-1">
                                                <div class="truncate text-sm font-medium">{name}</div>
                                                <div class="text-xs text-muted-foreground">{counts_label}</div>
                                            </div>

                                            <div class="hidden items-center gap-1 group-hover:flex">
                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Icon
                                                    class="h-7 w-7"
                                                    attr:title="Move up"
                                                    attr:disabled=move || idx == 0
                                                    on:click=move |ev: web_sys::MouseEvent| {
                                                        ev.stop_propagation();
                                                        move_list(id_for_up.clone(), MoveDirection::Up);
                                                    }
                                                >
                                                    <ChevronUp />
                                                </Button>

                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Icon
                                                    class="h-7 w-7"
                                                    attr:title="Move down"
                                                    attr:disabled=move || idx == last_idx
                                                    on:click=move |ev: web_sys::MouseEvent| {
                                                        ev.stop_propagation();
                                                        move_list(id_for_down.clone(), MoveDirection::Down);
                                                    }
                                                >
                                                    <ChevronDown />
                                                </Button>

                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Icon
                                                    class="h-7 w-7"
                                                    attr:title="Rename"
                                                    on:click=move |ev: web_sys::MouseEvent| {
                                                        ev.stop_propagation();
                                                        rename_target.set(id_for_rename.clone());
                                                        rename_value.set(name_for_rename.clone());
                                                        rename_error.set(None);
                                                        rename_open.set(true);
                                                    }
                                                >
                                                    "✎"
                                                </Button>

                                                <Button
                                                    variant=ButtonVariant::Ghost
                                                    size=ButtonSize::Icon
                                                    class="h-7 w-7 text-destructive"
                                                    attr:title="Delete"
                                                    on:click=move |ev: web_sys::MouseEvent| {
                                                        ev.stop_propagation();
                                                        delete_target.set(id_for_delete.clone());
                                                        delete_name.set(name_for_delete.clone());
                                                        delete_open.set(true);
                                                    }
                                                >
                                                    <X />
                                                </Button>
                                            </div>
                                        </li>
                                    }
                                })
                                .collect_view()
                        }}
                    </ul>
                </Show>

                <Show when=move || create_open.get() fallback=|| ().into_view()>
                    <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                        <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                            <div class="mb-3 space-y-1">
                                <div class="text-sm font-medium">"New list"</div>
                            </div>

                            <div class="space-y-2">
                                <div class="space-y-1">
                                    <Label class="text-xs">"Name"</Label>
                                    <Input
                                        node_ref=create_name_ref
                                        bind_value=create_name
                                        class="h-8 text-sm border-border bg-background"
                                    />
                                </div>
                                <div class="space-y-1">
                                    <Label class="text-xs">"Icon (optional emoji)"</Label>
                                    <Input
                                        bind_value=create_icon
                                        placeholder="🛒"
                                        class="h-8 text-sm border-border bg-background"
                                    />
                                </div>

                                <Show when=move || create_error.get().is_some() fallback=|| ().into_view()>
                                    {move || create_error.get().map(|e| view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                        </Alert>
                                    })}
                                </Show>

                                <div class="flex items-center justify-end gap-2 pt-2">
                                    <Button
                                        variant=ButtonVariant::Outline
                                        size=ButtonSize::Sm
                                        attr:disabled=move || create_loading.get()
                                        on:click=move |_| create_open.set(false)
                                    >
                                        "Cancel"
                                    </Button>
                                    <Button
                                        size=ButtonSize::Sm
                                        attr:disabled=move || create_loading.get()
                                        on:click=move |_| submit_create()
                                    >
                                        <span class="inline-flex items-center gap-2">
                                            <Show when=move || create_loading.get() fallback=|| ().into_view()>
                                                <Spinner />
                                            </Show>
                                            {move || if create_loading.get() { "Creating..." } else { "Create" }}
                                        </span>
                                    </Button>
                                </div>
                            </div>
                        </div>
                    </div>
                </Show>

                <Show when=move || rename_open.get() fallback=|| ().into_view()>
                    <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                        <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                            <div class="mb-3 space-y-1">
                                <div class="text-sm font-medium">"Rename list"</div>
                            </div>

                            <div class="space-y-2">
                                <div class="space-y-1">
                                    <Label class="text-xs">"New name"</Label>
                                    <Input bind_value=rename_value class="h-8 text-sm" />
                                </div>

                                <Show when=move || rename_error.get().is_some() fallback=|| ().into_view()>
                                    {move || rename_error.get().map(|e| view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                        </Alert>
                                    })}
                                </Show>

                                <div class="flex items-center justify-end gap-2 pt-2">
                                    <Button
                                        variant=ButtonVariant::Outline
                                        size=ButtonSize::Sm
                                        attr:disabled=move || rename_loading.get()
                                        on:click=move |_| rename_open.set(false)
                                    >
                                        "Cancel"
                                    </Button>
                                    <Button
                                        size=ButtonSize::Sm
                                        attr:disabled=move || rename_loading.get()
                                        on:click=move |_| submit_rename()
                                    >
                                        <span class="inline-flex items-center gap-2">
                                            <Show when=move || rename_loading.get() fallback=|| ().into_view()>
                                                <Spinner />
                                            </Show>
                                            {move || if rename_loading.get() { "Saving..." } else { "Save" }}
                                        </span>
                                    </Button>
                                </div>
                            </div>
                        </div>
                    </div>
                </Show>

                <Show when=move || delete_open.get() fallback=|| ().into_view()>
                    <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                        <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                            <div class="mb-3 space-y-1">
                                <div class="text-sm font-medium text-destructive">"Delete list"</div>
                                <div class="text-xs text-muted-foreground">
                                    "Deletes the list and all of its items for every member."
                                </div>
                            </div>

                            <div class="space-y-2">
                                <div class="rounded-md border border-border bg-muted px-3 py-2 text-sm">
                                    {move || delete_name.get()}
                                </div>

                                <div class="flex items-center justify-end gap-2 pt-2">
                                    <Button
                                        variant=ButtonVariant::Outline
                                        size=ButtonSize::Sm
                                        on:click=move |_| delete_open.set(false)
                                    >
                                        "Cancel"
                                    </Button>
                                    <Button
                                        variant=ButtonVariant::Outline
                                        size=ButtonSize::Sm
                                        class="border-destructive/40 text-destructive"
                                        on:click=move |_| submit_delete()
                                    >
                                        "Delete"
                                    </Button>
                                </div>
                            </div>
                        </div>
                    </div>
                </Show>
            </div>
        </div>
    }
}

#[component]
pub fn ListDetailPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = leptos_router::hooks::use_params::<ListRouteParams>();

    let items = app_state.0.items;
    let items_loading = app_state.0.items_loading;
    let items_error = app_state.0.items_error;
    let lists = app_state.0.lists;

    // Params are reactive; read tracked in effects/views, and read untracked in event handlers.
    let list_id = move || params.get().ok().and_then(|p| p.list_id).unwrap_or_default();
    let list_id_untracked = move || {
        params
            .get_untracked()
            .ok()
            .and_then(|p| p.list_id)
            .unwrap_or_default()
    };

    // Add form (creation waits for the backend-assigned id).
    let add_text: RwSignal<String> = RwSignal::new(String::new());
    let add_url: RwSignal<String> = RwSignal::new(String::new());
    let adding: RwSignal<bool> = RwSignal::new(false);
    let add_error: RwSignal<Option<String>> = RwSignal::new(None);

    // Inline text edit. The original value is kept to skip redundant saves.
    let editing_id: RwSignal<Option<String>> = RwSignal::new(None);
    let editing_value: RwSignal<String> = RwSignal::new(String::new());
    let editing_original: RwSignal<String> = RwSignal::new(String::new());
    let editing_ref: NodeRef<html::Input> = NodeRef::new();

    // Share modal.
    let share_open: RwSignal<bool> = RwSignal::new(false);
    let share_email: RwSignal<String> = RwSignal::new(String::new());
    let share_loading: RwSignal<bool> = RwSignal::new(false);
    let share_error: RwSignal<Option<String>> = RwSignal::new(None);
    let share_notice: RwSignal<Option<String>> = RwSignal::new(None);

    // Media customization modal.
    let customize_open: RwSignal<bool> = RwSignal::new(false);
    let media_error: RwSignal<Option<String>> = RwSignal::new(None);
    let icon_busy: RwSignal<bool> = RwSignal::new(false);
    let bg_busy: RwSignal<bool> = RwSignal::new(false);
    let reset_confirm: RwSignal<Option<MediaPurpose>> = RwSignal::new(None);
    let icon_file_ref: NodeRef<html::Input> = NodeRef::new();
    let bg_file_ref: NodeRef<html::Input> = NodeRef::new();

    // Drag state (items only move within their checked-state partition).
    let drag_item_id: RwSignal<Option<String>> = RwSignal::new(None);
    let drag_dirty: RwSignal<bool> = RwSignal::new(false);

    let load_items_sv = StoredValue::new(move |id: String, force: bool| {
        if id.trim().is_empty() {
            return;
        }

        if !force {
            let already_loaded = app_state
                .0
                .items_last_loaded_list_id
                .get_untracked()
                .as_deref()
                == Some(id.as_str());
            let has_error = items_error.get_untracked().is_some();
            let is_loading = items_loading.get_untracked();

            if already_loaded && !has_error && !is_loading {
                return;
            }
        }

        app_state.0.items_last_loaded_list_id.set(Some(id.clone()));

        let req_id = app_state
            .0
            .items_request_id
            .get_untracked()
            .saturating_add(1);
        app_state.0.items_request_id.set(req_id);

        items_loading.set(true);
        items_error.set(None);

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            let result = api_client.get_items(&id).await;

            // Ignore stale responses.
            if app_state.0.items_request_id.get_untracked() != req_id {
                return;
            }

            match result {
                Ok(mut rows) => {
                    ordering::sort_items(&mut rows);
                    items.set(rows);
                }
                Err(e) => {
                    if e.is_unauthorized() {
                        let mut c = app_state.0.api_client.get_untracked();
                        c.logout();
                        app_state.0.api_client.set(c);
                        app_state.0.current_user.set(None);
                        let _ = window().location().set_href("/login");
                    } else {
                        items_error.set(Some(e.to_string()));
                        items.set(vec![]);
                    }
                }
            }
            items_loading.set(false);
        });
    });

    let refetch_items = move || {
        let id = list_id_untracked();
        if !id.trim().is_empty() {
            load_items_sv.with_value(|f| f(id, true));
        }
    };

    Effect::new(move |_| {
        load_items_sv.with_value(|f| f(list_id(), false));
    });

    // Deep links land here without the collection loaded; fetch it quietly
    // so the header and media fields resolve.
    Effect::new(move |_| {
        if !lists.get().is_empty() || app_state.0.lists_loading.get_untracked() {
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        app_state.0.lists_loading.set(true);
        spawn_local(async move {
            match api_client.get_lists().await {
                Ok(mut rows) => {
                    ordering::sort_lists(&mut rows);
                    lists.set(rows);
                }
                Err(e) => {
                    if e.is_unauthorized() {
                        let mut c = app_state.0.api_client.get_untracked();
                        c.logout();
                        app_state.0.api_client.set(c);
                        app_state.0.current_user.set(None);
                        let _ = window().location().set_href("/login");
                    }
                }
            }
            app_state.0.lists_loading.set(false);
        });
    });

    // Live invalidation scoped to this list's items. Re-subscribes when the
    // route changes; the previous feed is closed first.
    let subscription = StoredValue::new_local(None::<ChangeSubscription>);
    Effect::new(move |_| {
        let id = list_id();

        subscription.update_value(|s| {
            if let Some(s) = s.take() {
                s.close();
            }
        });

        if id.trim().is_empty() {
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        let id_for_refetch = id.clone();
        let sub = realtime::subscribe(
            &api_client.base_url,
            api_client.get_auth_token(),
            &["items"],
            Some(("list-id", &id)),
            move || {
                load_items_sv.with_value(|f| f(id_for_refetch.clone(), true));
            },
        );
        subscription.set_value(sub);
    });
    on_cleanup(move || {
        subscription.update_value(|s| {
            if let Some(s) = s.take() {
                s.close();
            }
        });
    });

    let _key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" {
            share_open.set(false);
            customize_open.set(false);
            reset_confirm.set(None);
        }
    });

    let current_list = move || {
        let id = list_id();
        lists.get().into_iter().find(|l| l.id == id)
    };

    let submit_add = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        if adding.get_untracked() {
            return;
        }

        let id = list_id_untracked();
        let text = add_text.get_untracked();
        if id.trim().is_empty() || text.trim().is_empty() {
            return;
        }

        let url_val = add_url.get_untracked();
        let url = if url_val.trim().is_empty() {
            None
        } else {
            Some(url_val.trim().to_string())
        };

        let api_client = app_state.0.api_client.get_untracked();
        adding.set(true);
        add_error.set(None);

        spawn_local(async move {
            match api_client.add_item(&id, text.trim(), url).await {
                Ok(row) => {
                    items.update(|xs| {
                        xs.push(row);
                        ordering::sort_items(xs);
                    });
                    add_text.set(String::new());
                    add_url.set(String::new());
                }
                Err(e) => add_error.set(Some(e.to_string())),
            }
            adding.set(false);
        });
    };

    let on_toggle = move |id: String| {
        let Some(prior) = items
            .get_untracked()
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.checked)
        else {
            return;
        };

        let api_client = app_state.0.api_client.get_untracked();
        let id_for_apply = id.clone();
        let patch = ItemPatch {
            checked: Some(!prior),
            ..Default::default()
        };

        sync::run_optimistic(
            items,
            move |xs| {
                sync::toggle_checked(xs, &id_for_apply);
            },
            async move { api_client.update_item(&id, &patch).await },
            Recovery::Restore,
            move |e: ApiError| items_error.set(Some(e.to_string())),
        );
    };

    let start_edit = move |id: String, text: String| {
        editing_value.set(text.clone());
        editing_original.set(text);
        editing_id.set(Some(id));
    };

    Effect::new(move |_| {
        if editing_id.get().is_some() {
            if let Some(el) = editing_ref.get_untracked() {
                let _ = el.focus();
            }
        }
    });

    let commit_edit = move || {
        let Some(id) = editing_id.get_untracked() else {
            return;
        };
        editing_id.set(None);

        let text = editing_value.get_untracked().trim().to_string();
        if text.is_empty() || text == editing_original.get_untracked().trim() {
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            let patch = ItemPatch {
                text: Some(text.clone()),
                ..Default::default()
            };
            match api_client.update_item(&id, &patch).await {
                Ok(_) => {
                    items.update(|xs| {
                        if let Some(i) = xs.iter_mut().find(|i| i.id == id) {
                            i.text = text;
                        }
                    });
                }
                Err(e) => items_error.set(Some(e.to_string())),
            }
        });
    };

    let move_item = move |id: String, dir: MoveDirection| {
        let xs = items.get_untracked();
        let Some(checked) = xs.iter().find(|i| i.id == id).map(|i| i.checked) else {
            return;
        };

        let ordered = ordering::ordered_item_partition_ids(&xs, checked);
        // Boundary: nothing to write.
        let Some(writes) = ordering::step_move(&ordered, &id, dir) else {
            return;
        };

        let list = list_id_untracked();
        let api_client = app_state.0.api_client.get_untracked();
        let writes_for_apply = writes.clone();
        sync::run_optimistic(
            items,
            move |xs| {
                ordering::apply_item_positions(xs, &writes_for_apply);
                ordering::sort_items(xs);
            },
            async move { api_client.reorder_items(&list, &writes).await },
            Recovery::Refetch(Callback::new(move |_| refetch_items())),
            move |e: ApiError| items_error.set(Some(e.to_string())),
        );
    };

    // Drag release: the spliced order is already local state; persist the
    // dragged item's whole partition in one batch, or fall back to the
    // authoritative order if the write fails.
    let finish_item_drag = move || {
        let dragged = drag_item_id.get_untracked();
        let was_dirty = drag_dirty.get_untracked();
        drag_item_id.set(None);
        drag_dirty.set(false);

        let Some(dragged) = dragged else {
            return;
        };
        if !was_dirty {
            return;
        }

        let xs = items.get_untracked();
        let Some(checked) = xs.iter().find(|i| i.id == dragged).map(|i| i.checked) else {
            return;
        };

        let writes = ordering::renumber(&ordering::ordered_item_partition_ids(&xs, checked));
        let list = list_id_untracked();
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            if let Err(e) = api_client.reorder_items(&list, &writes).await {
                items_error.set(Some(e.to_string()));
                refetch_items();
            }
        });
    };

    let delete_item = move |id: String| {
        let api_client = app_state.0.api_client.get_untracked();
        let id_for_apply = id.clone();
        sync::run_optimistic(
            items,
            move |xs| {
                sync::remove_item(xs, &id_for_apply);
            },
            async move { api_client.delete_item(&id).await },
            Recovery::Refetch(Callback::new(move |_| refetch_items())),
            move |e: ApiError| items_error.set(Some(e.to_string())),
        );
    };

    let clear_checked = move |_: web_sys::MouseEvent| {
        let ids: Vec<String> = items
            .get_untracked()
            .iter()
            .filter(|i| i.checked)
            .map(|i| i.id.clone())
            .collect();
        if ids.is_empty() {
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        sync::run_optimistic(
            items,
            |xs| {
                sync::remove_checked(xs);
            },
            async move { api_client.delete_items(&ids).await },
            Recovery::Refetch(Callback::new(move |_| refetch_items())),
            move |e: ApiError| items_error.set(Some(e.to_string())),
        );
    };

    let submit_share = move || {
        if share_loading.get_untracked() {
            return;
        }

        let id = list_id_untracked();
        let email = normalize_email(&share_email.get_untracked());
        if email.is_empty() {
            share_error.set(Some("Enter an email address".to_string()));
            return;
        }

        let api_client = app_state.0.api_client.get_untracked();
        share_loading.set(true);
        share_error.set(None);
        share_notice.set(None);

        spawn_local(async move {
            match api_client.share_list(&id, &email).await {
                // Idempotent: sharing with an existing member is a silent success.
                Ok(_) => {
                    share_notice.set(Some(format!("Shared with {}", email)));
                    share_email.set(String::new());
                }
                Err(e) => match e.kind {
                    crate::api::ApiErrorKind::NotFound => {
                        share_error.set(Some("No account exists with that email".to_string()));
                    }
                    _ => {
                        share_error.set(Some("Could not share the list".to_string()));
                    }
                },
            }
            share_loading.set(false);
        });
    };

    let upload_media = move |purpose: MediaPurpose, file: web_sys::File| {
        let id = list_id_untracked();
        if id.trim().is_empty() {
            return;
        }

        media_error.set(None);
        match purpose {
            MediaPurpose::Icon => icon_busy.set(true),
            MediaPurpose::Background => bg_busy.set(true),
        }

        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            // Upload first, persist the URL second; failing either leaves
            // the prior media untouched.
            match upload_list_media(&api_client, &id, purpose, &file).await {
                Ok(url) => {
                    match api_client
                        .update_list_media(&id, purpose.field(), Some(&url))
                        .await
                    {
                        Ok(_) => {
                            lists.update(|xs| {
                                if let Some(l) = xs.iter_mut().find(|l| l.id == id) {
                                    match purpose {
                                        MediaPurpose::Icon => l.icon_url = Some(url.clone()),
                                        MediaPurpose::Background => {
                                            l.background_url = Some(url.clone())
                                        }
                                    }
                                }
                            });
                        }
                        Err(e) => media_error.set(Some(e.to_string())),
                    }
                }
                Err(e) => media_error.set(Some(e)),
            }

            match purpose {
                MediaPurpose::Icon => icon_busy.set(false),
                MediaPurpose::Background => bg_busy.set(false),
            }
        });
    };

    let reset_media = move |purpose: MediaPurpose| {
        let id = list_id_untracked();
        if id.trim().is_empty() {
            return;
        }

        media_error.set(None);
        let api_client = app_state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.update_list_media(&id, purpose.field(), None).await {
                Ok(_) => {
                    lists.update(|xs| {
                        if let Some(l) = xs.iter_mut().find(|l| l.id == id) {
                            match purpose {
                                MediaPurpose::Icon => l.icon_url = None,
                                MediaPurpose::Background => l.background_url = None,
                            }
                        }
                    });
                }
                Err(e) => media_error.set(Some(e.to_string())),
            }
            reset_confirm.set(None);
        });
    };

    let on_pick_file = move |purpose: MediaPurpose| {
        move |ev: web_sys::Event| {
            let Some(target) = ev.target() else {
                return;
            };
            let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() else {
                return;
            };
            let Some(file) = input.files().and_then(|fs| fs.get(0)) else {
                return;
            };
            // Allow re-picking the same file after a failure.
            input.set_value("");
            upload_media(purpose, file);
        }
    };

    let page_style = move || {
        current_list()
            .and_then(|l| l.background_url)
            .map(|url| {
                format!(
                    "background-image:url('{}');background-size:cover;background-position:center;",
                    url
                )
            })
            .unwrap_or_default()
    };

    view! {
        <div class="min-h-screen bg-background" style=page_style>
            <div class="mx-auto w-full max-w-2xl px-4 py-8">
                <div class="mb-4 flex items-center justify-between">
                    <nav class="flex min-w-0 items-center gap-2 text-sm">
                        <a href="/" class="shrink-0 font-medium text-foreground hover:underline">"Lists"</a>
                        <span class="text-muted-foreground">"›"</span>
                        {move || {
                            match current_list() {
                                Some(l) => view! {
                                    <div class="flex min-w-0 items-center gap-2">
                                        {match l.icon_url {
                                            Some(url) => view! {
                                                <img src=url class="h-5 w-5 rounded-sm object-cover" />
                                            }.into_any(),
                                            None => view! {
                                                <span>{if l.icon.is_empty() { "📋".to_string() } else { l.icon }}</span>
                                            }.into_any(),
                                        }}
                                        <span class="min-w-0 truncate font-medium">{l.name}</span>
                                    </div>
                                }.into_any(),
                                None => view! {
                                    <span class="text-muted-foreground">"..."</span>
                                }.into_any(),
                            }
                        }}
                    </nav>

                    <div class="flex shrink-0 items-center gap-2">
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            on:click=move |_| {
                                share_error.set(None);
                                share_notice.set(None);
                                share_open.set(true);
                            }
                        >
                            "Share"
                        </Button>

                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| {
                                media_error.set(None);
                                customize_open.set(true);
                            }
                        >
                            "Customize"
                        </Button>
                    </div>
                </div>

                <form class="mb-4 flex items-start gap-2" on:submit=submit_add>
                    <div class="flex min-w-0 flex-1 flex-col gap-1.5">
                        <Input
                            bind_value=add_text
                            placeholder="Add an item..."
                            class="h-8 text-sm border-border bg-background"
                        />
                        <Input
                            bind_value=add_url
                            placeholder="Link (optional)"
                            class="h-8 text-sm border-border bg-background"
                        />
                    </div>
                    <Button size=ButtonSize::Sm attr:disabled=move || adding.get()>
                        <span class="inline-flex items-center gap-2">
                            <Show when=move || adding.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            {move || if adding.get() { "Adding..." } else { "Add" }}
                        </span>
                    </Button>
                </form>

                <Show when=move || add_error.get().is_some() fallback=|| ().into_view()>
                    {move || add_error.get().map(|e| view! {
                        <Alert class="mb-3 border-destructive/30">
                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                        </Alert>
                    })}
                </Show>

                <Show when=move || items_error.get().is_some() fallback=|| ().into_view()>
                    {move || items_error.get().map(|e| view! {
                        <Alert class="mb-3 border-destructive/30">
                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                        </Alert>
                    })}
                </Show>

                {move || {
                    let mut xs = items.get();
                    ordering::sort_items(&mut xs);

                    let unchecked: Vec<Item> = xs.iter().filter(|i| !i.checked).cloned().collect();
                    let checked: Vec<Item> = xs.iter().filter(|i| i.checked).cloned().collect();
                    let n_unchecked = unchecked.len();
                    let n_checked = checked.len();

                    let row = move |item: Item, idx: usize, len: usize| {
                        let id = item.id.clone();
                        let text = item.text.clone();
                        let url = item.url.clone();
                        let checked_flag = item.checked;

                        let id_for_toggle = id.clone();
                        let id_for_edit = id.clone();
                        let text_for_edit = text.clone();
                        let id_for_up = id.clone();
                        let id_for_down = id.clone();
                        let id_for_delete = id.clone();
                        let id_for_dragstart = id.clone();
                        let id_for_dragover = id.clone();

                        let is_editing = move || editing_id.get().as_deref() == Some(id.as_str());

                        view! {
                            <li
                                class="group flex items-center gap-2 rounded-md border border-border bg-card px-3 py-2"
                                draggable="true"
                                on:dragstart=move |ev: web_sys::DragEvent| {
                                    if let Some(dt) = ev.data_transfer() {
                                        let _ = dt.set_data("text/plain", &id_for_dragstart);
                                        dt.set_drop_effect("move");
                                    }
                                    drag_item_id.set(Some(id_for_dragstart.clone()));
                                    drag_dirty.set(false);
                                }
                                on:dragover=move |ev: web_sys::DragEvent| {
                                    ev.prevent_default();
                                    let Some(dragged) = drag_item_id.get_untracked() else {
                                        return;
                                    };

                                    let xs = items.get_untracked();
                                    let Some(dragged_checked) = xs
                                        .iter()
                                        .find(|i| i.id == dragged)
                                        .map(|i| i.checked)
                                    else {
                                        return;
                                    };

                                    // splice() rejects targets outside the dragged
                                    // item's partition, so hovering the other group
                                    // is a no-op.
                                    let ordered = ordering::ordered_item_partition_ids(&xs, dragged_checked);
                                    if let Some(writes) = ordering::splice(&ordered, &dragged, &id_for_dragover) {
                                        items.update(|xs| {
                                            ordering::apply_item_positions(xs, &writes);
                                            ordering::sort_items(xs);
                                        });
                                        drag_dirty.set(true);
                                    }
                                }
                                on:drop=move |ev: web_sys::DragEvent| {
                                    ev.prevent_default();
                                }
                                on:dragend=move |_ev: web_sys::DragEvent| {
                                    finish_item_drag();
                                }
                            >
                                <input
                                    type="checkbox"
                                    class="size-4 shrink-0 cursor-pointer accent-primary"
                                    prop:checked=checked_flag
                                    on:change=move |_| on_toggle(id_for_toggle.clone())
                                />

                                <div class="min-w-0 flex-1">
                                    <Show
                                        when=is_editing
                                        fallback=move || {
                                            let text = text_for_edit.clone();
                                            let id = id_for_edit.clone();
                                            let label_class = if checked_flag {
                                                "cursor-text truncate text-sm text-muted-foreground line-through"
                                            } else {
                                                "cursor-text truncate text-sm"
                                            };
                                            view! {
                                                <div
                                                    class=label_class
                                                    on:click=move |_| start_edit(id.clone(), text.clone())
                                                >
                                                    {text_for_edit.clone()}
                                                </div>
                                            }
                                        }
                                    >
                                        <input
                                            class="h-7 w-full rounded-sm border border-border bg-background px-2 text-sm outline-none focus:border-ring"
                                            node_ref=editing_ref
                                            prop:value=move || editing_value.get()
                                            on:input=move |ev: web_sys::Event| {
                                                if let Some(target) = ev.target() {
                                                    if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
                                                        editing_value.set(input.value());
                                                    }
                                                }
                                            }
                                            on:keydown=move |ev: web_sys::KeyboardEvent| {
                                                if ev.key() == "Enter" {
                                                    commit_edit();
                                                } else if ev.key() == "Escape" {
                                                    editing_id.set(None);
                                                }
                                            }
                                            on:blur=move |_| commit_edit()
                                        />
                                    </Show>
                                </div>

                                {url.map(|u| view! {
                                    <a
                                        href=u
                                        target="_blank"
                                        rel="noreferrer"
                                        class="shrink-0 text-xs text-primary underline underline-offset-4"
                                        on:click=move |ev: web_sys::MouseEvent| ev.stop_propagation()
                                    >
                                        "link"
                                    </a>
                                })}

                                <div class="hidden shrink-0 items-center gap-1 group-hover:flex">
                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Icon
                                        class="h-7 w-7"
                                        attr:title="Move up"
                                        attr:disabled=move || idx == 0
                                        on:click=move |_| move_item(id_for_up.clone(), MoveDirection::Up)
                                    >
                                        <ChevronUp />
                                    </Button>

                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Icon
                                        class="h-7 w-7"
                                        attr:title="Move down"
                                        attr:disabled=move || idx + 1 >= len
                                        on:click=move |_| move_item(id_for_down.clone(), MoveDirection::Down)
                                    >
                                        <ChevronDown />
                                    </Button>

                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Icon
                                        class="h-7 w-7 text-destructive"
                                        attr:title="Delete"
                                        on:click=move |_| delete_item(id_for_delete.clone())
                                    >
                                        <X />
                                    </Button>
                                </div>
                            </li>
                        }
                    };

                    view! {
                        <div class="space-y-4">
                            {if n_unchecked == 0 {
                                view! {
                                    <div class="rounded-md border border-dashed border-border px-4 py-8 text-center text-sm text-muted-foreground">
                                        {move || if items_loading.get() {
                                            "Loading items..."
                                        } else {
                                            "Nothing to get."
                                        }}
                                    </div>
                                }.into_any()
                            } else {
                                view! {
                                    <ul class="flex flex-col gap-1.5">
                                        {unchecked
                                            .into_iter()
                                            .enumerate()
                                            .map(|(idx, it)| row(it, idx, n_unchecked))
                                            .collect_view()}
                                    </ul>
                                }.into_any()
                            }}

                            {(n_checked > 0).then(|| view! {
                                <div>
                                    <div class="mb-1.5 flex items-center justify-between">
                                        <div class="text-xs font-medium text-muted-foreground">
                                            {format!("Done ({})", n_checked)}
                                        </div>
                                        <Button
                                            variant=ButtonVariant::Ghost
                                            size=ButtonSize::Sm
                                            class="h-6 text-xs text-muted-foreground"
                                            on:click=clear_checked
                                        >
                                            "Clear checked"
                                        </Button>
                                    </div>
                                    <ul class="flex flex-col gap-1.5">
                                        {checked
                                            .into_iter()
                                            .enumerate()
                                            .map(|(idx, it)| row(it, idx, n_checked))
                                            .collect_view()}
                                    </ul>
                                </div>
                            })}
                        </div>
                    }
                }}

                <Show when=move || share_open.get() fallback=|| ().into_view()>
                    <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                        <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                            <div class="mb-3 space-y-1">
                                <div class="text-sm font-medium">"Share list"</div>
                                <div class="text-xs text-muted-foreground">
                                    "Members can add, check and reorder items."
                                </div>
                            </div>

                            <div class="space-y-2">
                                <div class="space-y-1">
                                    <Label class="text-xs">"Email"</Label>
                                    <Input
                                        r#type="email"
                                        bind_value=share_email
                                        placeholder="friend@example.com"
                                        class="h-8 text-sm border-border bg-background"
                                    />
                                </div>

                                <Show when=move || share_error.get().is_some() fallback=|| ().into_view()>
                                    {move || share_error.get().map(|e| view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                        </Alert>
                                    })}
                                </Show>

                                <Show when=move || share_notice.get().is_some() fallback=|| ().into_view()>
                                    {move || share_notice.get().map(|n| view! {
                                        <Alert>
                                            <AlertDescription class="text-xs">{n}</AlertDescription>
                                        </Alert>
                                    })}
                                </Show>

                                <div class="flex items-center justify-end gap-2 pt-2">
                                    <Button
                                        variant=ButtonVariant::Outline
                                        size=ButtonSize::Sm
                                        attr:disabled=move || share_loading.get()
                                        on:click=move |_| share_open.set(false)
                                    >
                                        "Close"
                                    </Button>
                                    <Button
                                        size=ButtonSize::Sm
                                        attr:disabled=move || share_loading.get()
                                        on:click=move |_| submit_share()
                                    >
                                        <span class="inline-flex items-center gap-2">
                                            <Show when=move || share_loading.get() fallback=|| ().into_view()>
                                                <Spinner />
                                            </Show>
                                            {move || if share_loading.get() { "Sharing..." } else { "Share" }}
                                        </span>
                                    </Button>
                                </div>
                            </div>
                        </div>
                    </div>
                </Show>

                <Show when=move || customize_open.get() fallback=|| ().into_view()>
                    <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                        <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                            <div class="mb-3 space-y-1">
                                <div class="text-sm font-medium">"Customize list"</div>
                                <div class="text-xs text-muted-foreground">
                                    "Upload a custom icon or background image."
                                </div>
                            </div>

                            <div class="space-y-2">
                                <input
                                    type="file"
                                    accept="image/*"
                                    class="hidden"
                                    node_ref=icon_file_ref
                                    on:change=on_pick_file(MediaPurpose::Icon)
                                />
                                <input
                                    type="file"
                                    accept="image/*"
                                    class="hidden"
                                    node_ref=bg_file_ref
                                    on:change=on_pick_file(MediaPurpose::Background)
                                />

                                <div class="flex items-center justify-between gap-2">
                                    <div class="text-sm">"Icon"</div>
                                    <div class="flex items-center gap-1">
                                        <Button
                                            variant=ButtonVariant::Outline
                                            size=ButtonSize::Sm
                                            attr:disabled=move || icon_busy.get()
                                            on:click=move |_| {
                                                if let Some(el) = icon_file_ref.get_untracked() {
                                                    el.click();
                                                }
                                            }
                                        >
                                            <span class="inline-flex items-center gap-2">
                                                <Show when=move || icon_busy.get() fallback=|| ().into_view()>
                                                    <Spinner />
                                                </Show>
                                                {move || if icon_busy.get() { "Uploading..." } else { "Upload" }}
                                            </span>
                                        </Button>
                                        <Button
                                            variant=ButtonVariant::Ghost
                                            size=ButtonSize::Sm
                                            class="text-muted-foreground"
                                            attr:disabled=move || current_list().map(|l| l.icon_url.is_none()).unwrap_or(true)
                                            on:click=move |_| reset_confirm.set(Some(MediaPurpose::Icon))
                                        >
                                            "Reset"
                                        </Button>
                                    </div>
                                </div>

                                <div class="flex items-center justify-between gap-2">
                                    <div class="text-sm">"Background"</div>
                                    <div class="flex items-center gap-1">
                                        <Button
                                            variant=ButtonVariant::Outline
                                            size=ButtonSize::Sm
                                            attr:disabled=move || bg_busy.get()
                                            on:click=move |_| {
                                                if let Some(el) = bg_file_ref.get_untracked() {
                                                    el.click();
                                                }
                                            }
                                        >
                                            <span class="inline-flex items-center gap-2">
                                                <Show when=move || bg_busy.get() fallback=|| ().into_view()>
                                                    <Spinner />
                                                </Show>
                                                {move || if bg_busy.get() { "Uploading..." } else { "Upload" }}
                                            </span>
                                        </Button>
                                        <Button
                                            variant=ButtonVariant::Ghost
                                            size=ButtonSize::Sm
                                            class="text-muted-foreground"
                                            attr:disabled=move || current_list().map(|l| l.background_url.is_none()).unwrap_or(true)
                                            on:click=move |_| reset_confirm.set(Some(MediaPurpose::Background))
                                        >
                                            "Reset"
                                        </Button>
                                    </div>
                                </div>

                                <Show when=move || media_error.get().is_some() fallback=|| ().into_view()>
                                    {move || media_error.get().map(|e| view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                                        </Alert>
                                    })}
                                </Show>

                                <div class="flex items-center justify-end pt-2">
                                    <Button
                                        variant=ButtonVariant::Outline
                                        size=ButtonSize::Sm
                                        on:click=move |_| customize_open.set(false)
                                    >
                                        "Close"
                                    </Button>
                                </div>
                            </div>
                        </div>
                    </div>
                </Show>

                <Show when=move || reset_confirm.get().is_some() fallback=|| ().into_view()>
                    <div class="fixed inset-0 z-[60] flex items-center justify-center bg-black/30 px-4">
                        <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg">
                            <div class="mb-3 space-y-1">
                                <div class="text-sm font-medium">"Reset image"</div>
                                <div class="text-xs text-muted-foreground">
                                    {move || match reset_confirm.get() {
                                        Some(MediaPurpose::Icon) => "Revert to the default icon?",
                                        Some(MediaPurpose::Background) => "Remove the background image?",
                                        None => "",
                                    }}
                                </div>
                            </div>

                            <div class="flex items-center justify-end gap-2 pt-2">
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| reset_confirm.set(None)
                                >
                                    "Cancel"
                                </Button>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    class="border-destructive/40 text-destructive"
                                    on:click=move |_| {
                                        if let Some(purpose) = reset_confirm.get_untracked() {
                                            reset_media(purpose);
                                        }
                                    }
                                >
                                    "Reset"
                                </Button>
                            </div>
                        </div>
                    </div>
                </Show>
            </div>
        </div>
    }
}
