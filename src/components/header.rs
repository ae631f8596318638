//! 页面标题组件

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1 class="text-center">"仪表读数识别系统"</h1>
        </header>
    }
}
