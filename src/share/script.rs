//! Browser side of the share button, served at `/assets/share.js`
//!
//! Buttons carry `data-share-title`, `data-share-text` and `data-share-url`;
//! the acknowledgment element is the button's `[data-share-ack]` child.

/// Route the script is served from
pub const SHARE_SCRIPT_PATH: &str = "/assets/share.js";

/// Share button behavior
pub const SHARE_SCRIPT: &str = r#"(function() {
    var ACK_MS = 2000;

    function legacyCopy(text) {
        var area = document.createElement('textarea');
        area.value = text;
        area.setAttribute('readonly', '');
        area.style.position = 'absolute';
        area.style.left = '-9999px';
        document.body.appendChild(area);
        area.select();
        try { document.execCommand('copy'); } catch (e) {}
        document.body.removeChild(area);
    }

    function acknowledge(button) {
        var ack = button.querySelector('[data-share-ack]');
        if (!ack) return;
        var generation = (button._shareGeneration || 0) + 1;
        button._shareGeneration = generation;
        ack.hidden = false;
        setTimeout(function() {
            if (button._shareGeneration === generation) {
                ack.hidden = true;
            }
        }, ACK_MS);
    }

    function activate(button) {
        var data = {
            title: button.getAttribute('data-share-title') || document.title,
            text: button.getAttribute('data-share-text') || '',
            url: button.getAttribute('data-share-url') || location.href
        };

        if (navigator.share) {
            navigator.share(data).catch(function() {});
            return;
        }

        var copy = navigator.clipboard && navigator.clipboard.writeText
            ? navigator.clipboard.writeText(data.url)
            : Promise.reject(new Error('clipboard unavailable'));

        copy.catch(function() { legacyCopy(data.url); })
            .then(function() { acknowledge(button); });
    }

    document.addEventListener('click', function(event) {
        var button = event.target.closest && event.target.closest('[data-share-url]');
        if (button && button.tagName === 'BUTTON') {
            event.preventDefault();
            activate(button);
        }
    });
})();
"#;
