//! JavaScript probes evaluated inside the live page.

pub const SCROLL_METRICS: &str = r#"
const d = document.documentElement;
const b = document.body || d;
return {
    scrollX: window.scrollX,
    scrollY: window.scrollY,
    scrollHeight: Math.max(d.scrollHeight, b.scrollHeight),
    scrollWidth: Math.max(d.scrollWidth, b.scrollWidth),
    viewportWidth: window.innerWidth,
    viewportHeight: window.innerHeight
};
"#;

pub const SCROLL_TO: &str = r#"
window.scrollTo(arguments[0], arguments[1]);
window.dispatchEvent(new Event('scroll'));
return true;
"#;

pub const SCROLL_INTO_VIEW: &str = r#"
const el = document.querySelector(arguments[0]);
if (!el) return false;
el.scrollIntoView({ block: 'center' });
return true;
"#;

/// Reads only; never moves the page
pub const IS_VISIBLE: &str = r#"
const el = document.querySelector(arguments[0]);
if (!el) return false;
const style = window.getComputedStyle(el);
if (style.display === 'none' || style.visibility === 'hidden' || style.opacity === '0') {
    return false;
}
const r = el.getBoundingClientRect();
if (r.width === 0 || r.height === 0) return false;
return r.bottom > 0 && r.right > 0 && r.top < window.innerHeight && r.left < window.innerWidth;
"#;

pub const COUNT: &str = r#"
return document.querySelectorAll(arguments[0]).length;
"#;

pub const CLICK: &str = r#"
const el = document.querySelector(arguments[0]);
if (!el) return false;
el.click();
return true;
"#;

pub const READY_STATE: &str = r#"
return document.readyState;
"#;

pub const DISPATCH_HOVER: &str = r#"
const all = Array.from(document.querySelectorAll('body *')).slice(0, 3000);
let count = 0;
for (const el of all) {
    const r = el.getBoundingClientRect();
    const init = { bubbles: true, clientX: r.left + r.width / 2, clientY: r.top + r.height / 2 };
    el.dispatchEvent(new MouseEvent('mouseover', init));
    el.dispatchEvent(new MouseEvent('mouseenter', init));
    el.dispatchEvent(new MouseEvent('mousemove', init));
    count++;
}
return count;
"#;

/// Percentage of the viewport covered by visible images
pub const IMAGE_AREA: &str = r#"
const vw = window.innerWidth, vh = window.innerHeight;
if (!vw || !vh) return 0;
let area = 0;
for (const img of document.images) {
    const r = img.getBoundingClientRect();
    const w = Math.max(0, Math.min(r.right, vw) - Math.max(r.left, 0));
    const h = Math.max(0, Math.min(r.bottom, vh) - Math.max(r.top, 0));
    area += w * h;
}
return Math.min(100, (area / (vw * vh)) * 100);
"#;

/// Signals used by the infinite-scroll confidence score
pub const INFINITE_SCROLL_PROBE: &str = r#"
const loading = document.querySelector(
    '[class*="loading"], [class*="spinner"], [class*="loader"], [aria-busy="true"], [role="progressbar"]'
);
const lazy = document.querySelectorAll(
    'img[loading="lazy"], img[data-src], img[data-lazy-src], img.lazyload, img.lazy'
).length;
const sentinel = document.querySelector(
    '[class*="sentinel"], [class*="infinite"], [data-infinite-scroll], [class*="scroll-trigger"], [class*="load-trigger"]'
);
return {
    loadingIndicators: loading !== null,
    lazyImages: lazy,
    sentinels: sentinel !== null,
    intersectionObserver: typeof window.IntersectionObserver === 'function'
};
"#;
